//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use crate::backends::tree::TreeMode;
use crate::core::policy::InclusionPolicy;
use crate::core::render::OutputStyle;
use crate::core::tokenizer::TokenModel;
use crate::core::util::parse_size;
use crate::flows::flatten::{FlattenOptions, DEFAULT_OUTPUT};
use crate::flows::list::ListFormat;
use crate::flows::select::{Selection, SourceKind};

/// flatrepo - flatten a source tree into one text or Markdown document.
#[derive(Parser, Debug)]
#[command(name = "flatrepo")]
#[command(
    author,
    version,
    about,
    long_about = r#"flatrepo walks a source tree, keeps the files that pass the selection
rules, and concatenates them into a single document for feeding into
language models or reviewers.

Selection rules:
- files must carry an included extension (default: .py) or be a well-known
  bare file such as Makefile or Dockerfile
- excluded directory names are pruned at any depth
- --exclude patterns use .gitignore syntax
- --max-size drops files larger than the limit

Output styles:
- plain: separator-delimited file dumps (default)
- markdown: title, directory tree, one fenced block per file

Examples:
    flatrepo flatten
    flatrepo flatten --ext py,toml --style markdown -o context.md
    flatrepo flatten --source git --fallback-walk
    flatrepo list --exclude 'tests/**'
    flatrepo doctor
"#
)]
pub struct Cli {
    /// Root directory to flatten.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "ROOT",
        long_help = "Root directory to flatten (defaults to the current directory).\n\n\
All paths in the output are relative to this root and use '/' as separator."
    )]
    pub root: PathBuf,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output. This is useful when piping to files or when your\n\
terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (warnings and errors only).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Only log warnings and errors, and skip the end-of-run summary.\n\
The output file and list results are unaffected."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable debug logging on stderr, including every pruned directory and\n\
rejected file."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that collects files
#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    /// File extensions to include (comma-separated or repeated).
    #[arg(
        long = "ext",
        value_name = "EXT",
        value_delimiter = ',',
        long_help = "File extensions to include, with or without the leading dot.\n\n\
Matching is case-insensitive. Replaces the default set (py).\n\n\
Example: --ext py,pyi,toml"
    )]
    pub extensions: Vec<String>,

    /// Directory names to exclude (replaces the defaults).
    #[arg(
        long = "exclude-dir",
        value_name = "NAME",
        value_delimiter = ',',
        long_help = "Directory names pruned at any depth. Replaces the default set\n\
(.git, __pycache__, .venv, venv, env, .mypy_cache, .pytest_cache).\n\n\
Names are matched exactly, so `venv` does not exclude `venvs`."
    )]
    pub exclude_dirs: Vec<String>,

    /// Directory names to exclude in addition to the defaults.
    #[arg(long = "add-exclude-dir", value_name = "NAME", value_delimiter = ',')]
    pub add_exclude_dirs: Vec<String>,

    /// Exclusion pattern in .gitignore syntax (repeatable).
    #[arg(
        long = "exclude",
        value_name = "PATTERN",
        long_help = "Exclude files matching PATTERN, using .gitignore syntax relative to ROOT.\n\n\
A pattern without '/' matches at any depth; a pattern with '/' is anchored at\n\
ROOT; '**' crosses directories. Matching a directory excludes everything below it.\n\n\
Examples:\n\
  --exclude '*_test.py'\n\
  --exclude 'docs/**'\n\
  --exclude build/"
    )]
    pub exclude_patterns: Vec<String>,

    /// Maximum file size (e.g. 4096, 512k, 2M).
    #[arg(
        long = "max-size",
        value_name = "SIZE",
        value_parser = parse_size,
        long_help = "Skip files larger than SIZE bytes. A file of exactly SIZE bytes is kept.\n\n\
Accepts binary suffixes: k, M, G. Unlimited when omitted."
    )]
    pub max_size: Option<u64>,

    /// Where the file list comes from (walk/git).
    #[arg(
        long,
        default_value = "walk",
        value_parser = ["walk", "git"],
        value_name = "SOURCE",
        long_help = "Where candidate files come from.\n\n\
- walk: recursive filesystem walk in lexical order (default)\n\
- git: files tracked by `git ls-files`, in listing order\n\n\
With git, a missing git binary or a ROOT outside a repository is an error\n\
unless --fallback-walk is given."
    )]
    pub source: String,

    /// Walk the filesystem when the git listing is unavailable.
    #[arg(long)]
    pub fallback_walk: bool,
}

impl SelectArgs {
    /// Build the immutable selection once for the whole run
    pub fn to_selection(&self) -> Result<Selection> {
        let mut builder = InclusionPolicy::builder();
        if !self.extensions.is_empty() {
            builder = builder.include_extensions(&self.extensions);
        }
        if !self.exclude_dirs.is_empty() {
            builder = builder.exclude_dirs(&self.exclude_dirs);
        }
        let policy = builder
            .add_exclude_dirs(&self.add_exclude_dirs)
            .exclude_patterns(self.exclude_patterns.iter().cloned())
            .max_file_size(self.max_size)
            .build()
            .context("Invalid selection rules")?;

        let source: SourceKind = self.source.parse().map_err(anyhow::Error::msg)?;

        Ok(Selection {
            policy,
            source,
            fallback_walk: self.fallback_walk,
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten the selected files into one output document.
    #[command(
        long_about = "Collect the selected files, read them, and write one document to --output\n\
(overwriting it). Unreadable files get a placeholder; oversized files are\n\
skipped and counted. A summary with the token estimate goes to stderr.\n\n\
Examples:\n\
  flatrepo flatten\n\
  flatrepo flatten --style markdown --tree builtin -o repo.md\n\
  flatrepo flatten --max-size 64k --exclude 'migrations/**'\n"
    )]
    Flatten {
        #[command(flatten)]
        select: SelectArgs,

        /// Output file (relative to the current directory).
        #[arg(short, long, default_value = DEFAULT_OUTPUT, value_name = "FILE")]
        output: PathBuf,

        /// Output style (plain/markdown).
        #[arg(
            long,
            default_value = "plain",
            value_parser = ["plain", "markdown", "md"],
            value_name = "STYLE"
        )]
        style: String,

        /// Directory tree provider for markdown output (command/builtin/none).
        #[arg(
            long,
            default_value = "command",
            value_parser = ["command", "builtin", "none"],
            value_name = "MODE",
            long_help = "How the markdown directory tree is produced.\n\n\
- command: run the external `tree` command (section omitted if missing)\n\
- builtin: draw the tree from the collected files\n\
- none: no tree section\n\n\
Ignored for plain output."
        )]
        tree: String,

        /// Encoding used for the token estimate.
        #[arg(
            long,
            default_value = "cl100k",
            value_name = "MODEL",
            long_help = "Encoding used for the token estimate in the summary.\n\n\
Supported values: cl100k (default), o200k, heuristic."
        )]
        token_model: String,

        /// Markdown title (defaults to the root directory name).
        #[arg(long, value_name = "TITLE")]
        title: Option<String>,
    },

    /// Print the files that would be flattened, without reading them.
    #[command(
        long_about = "Run collection only and print the candidates in order.\n\n\
Examples:\n\
  flatrepo list\n\
  flatrepo list --format paths --ext py,pyi\n"
    )]
    List {
        #[command(flatten)]
        select: SelectArgs,

        /// Output format (jsonl/json/paths).
        #[arg(
            long,
            default_value = "jsonl",
            value_parser = ["jsonl", "json", "paths"],
            value_name = "FORMAT"
        )]
        format: String,

        /// Pretty-print JSON output with indentation.
        #[arg(long)]
        pretty: bool,
    },

    /// Check optional external tools.
    #[command(
        long_about = "Check whether the optional collaborators are installed:\n\
  - git (--source git)\n\
  - tree (--tree command)\n\n\
Missing tools only degrade output; the command always succeeds."
    )]
    Doctor,
}

/// Install the stderr log subscriber for this run
fn init_tracing(quiet: bool, verbose: bool, no_color: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(!no_color)
        .without_time()
        .try_init();
}

pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.quiet, cli.verbose, cli.no_color);

    // Get absolute root path
    let root = cli.root.canonicalize().unwrap_or(cli.root);

    match cli.command {
        Commands::Flatten {
            select,
            output,
            style,
            tree,
            token_model,
            title,
        } => {
            let selection = select.to_selection()?;
            let opts = FlattenOptions {
                output,
                style: style.parse::<OutputStyle>().map_err(anyhow::Error::msg)?,
                tree: tree.parse::<TreeMode>().map_err(anyhow::Error::msg)?,
                token_model: token_model
                    .parse::<TokenModel>()
                    .map_err(anyhow::Error::msg)?,
                title,
            };
            crate::flows::flatten::run_flatten(&root, &selection, &opts, cli.quiet)
        }

        Commands::List {
            select,
            format,
            pretty,
        } => {
            let selection = select.to_selection()?;
            let format = format.parse::<ListFormat>().map_err(anyhow::Error::msg)?;
            crate::flows::list::run_list(&root, &selection, format, pretty)
        }

        Commands::Doctor => crate::backends::doctor::run_doctor(),
    }
}
