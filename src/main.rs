//! flatrepo - Flatten a source tree into a single document
//!
//! flatrepo provides:
//! - Extension, directory and glob based file selection
//! - Filesystem walk or `git ls-files` as the file source
//! - Plain text or Markdown output with a directory tree
//! - Token estimates for the produced document

use anyhow::Result;
use clap::Parser;

mod backends;
mod cli;
mod core;
mod flows;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
