//! Flatten flow - Collect, read, render and write one output document
//!
//! Per-file problems never abort the run: unreadable files become
//! placeholders and oversized files are counted. Only an unavailable
//! tracked-file source (without fallback) or a failed output write stops it,
//! and in the first case nothing is written.

use anyhow::Result;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::backends::tree::TreeMode;
use crate::core::error::FlattenError;
use crate::core::file_reader::read_candidate;
use crate::core::language::language_for;
use crate::core::model::{Availability, Collection, Entry, RenderedDocument};
use crate::core::paths::absolutize;
use crate::core::render::{OutputStyle, Renderer};
use crate::core::tokenizer::{count_tokens, TokenModel};
use crate::core::util::format_bytes;
use crate::flows::select::{gather, Selection};

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "flattened_repo.txt";

/// Options that shape the output document
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    pub output: PathBuf,
    pub style: OutputStyle,
    pub tree: TreeMode,
    pub token_model: TokenModel,
    /// Document title; defaults to the root directory name
    pub title: Option<String>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            style: OutputStyle::Plain,
            tree: TreeMode::Command,
            token_model: TokenModel::Cl100k,
            title: None,
        }
    }
}

/// What a run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenSummary {
    pub included: usize,
    pub unreadable: usize,
    pub lossy: usize,
    pub skipped_for_size: usize,
    pub excluded: usize,
    pub has_tree: bool,
    pub bytes_written: u64,
    pub tokens: usize,
    pub output: PathBuf,
}

/// Run the whole pipeline and write the output file
pub fn flatten(
    root: &Path,
    selection: &Selection,
    opts: &FlattenOptions,
) -> Result<FlattenSummary, FlattenError> {
    let output_abs = absolutize(&opts.output);
    let collection = gather(root, selection, Some(&output_abs))?;

    if collection.is_empty() {
        warn!("No files matched the selection rules");
    }

    let document = build_document(root, selection, &collection, opts);
    let rendered = Renderer::new(opts.style).render(&document);
    let tokens = count_tokens(&rendered, opts.token_model);

    fs::write(&opts.output, &rendered).map_err(|source| FlattenError::OutputWrite {
        path: opts.output.clone(),
        source,
    })?;

    let unreadable = document.entries.iter().filter(|e| e.content.is_err()).count();
    let lossy = document
        .entries
        .iter()
        .filter(|e| matches!(&e.content, Ok(c) if c.lossy))
        .count();

    Ok(FlattenSummary {
        included: document.entries.len(),
        unreadable,
        lossy,
        skipped_for_size: collection.skipped_for_size,
        excluded: collection.excluded,
        has_tree: document.tree.is_some(),
        bytes_written: rendered.len() as u64,
        tokens,
        output: opts.output.clone(),
    })
}

/// Read every candidate and assemble the document to render
pub fn build_document(
    root: &Path,
    selection: &Selection,
    collection: &Collection,
    opts: &FlattenOptions,
) -> RenderedDocument {
    let mut entries = Vec::with_capacity(collection.len());

    for candidate in &collection.candidates {
        info!("Including file: {}", candidate.relative_path);
        let content = read_candidate(candidate);
        match &content {
            Ok(c) if c.lossy => warn!(
                "{}: invalid UTF-8 bytes replaced",
                candidate.relative_path
            ),
            Err(err) => warn!("Could not read {}: {}", candidate.relative_path, err),
            Ok(_) => {}
        }

        entries.push(Entry {
            path: candidate.relative_path.clone(),
            content,
            language: language_for(&candidate.relative_path),
        });
    }

    let tree = if opts.style.wants_tree() {
        opts.tree.provider().and_then(|provider| {
            match provider.render_tree(root, &selection.policy, &collection.candidates) {
                Availability::Available(tree) => Some(tree),
                Availability::Unavailable(reason) => {
                    warn!("Directory tree unavailable: {}", reason);
                    None
                }
            }
        })
    } else {
        None
    };

    RenderedDocument {
        title: opts.title.clone().unwrap_or_else(|| root_title(root)),
        tree,
        entries,
    }
}

/// Title derived from the root directory name
fn root_title(root: &Path) -> String {
    absolutize(root)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

/// Run the flatten command
pub fn run_flatten(
    root: &Path,
    selection: &Selection,
    opts: &FlattenOptions,
    quiet: bool,
) -> Result<()> {
    let summary = flatten(root, selection, opts)?;

    if !quiet {
        print_summary(&summary, opts.token_model);
    }

    Ok(())
}

fn print_summary(summary: &FlattenSummary, model: TokenModel) {
    eprintln!();
    eprintln!("{}", "Flatten Summary:".bold());
    eprintln!("   Files included: {}", summary.included);
    if summary.skipped_for_size > 0 {
        eprintln!(
            "   {}",
            format!("Skipped for size: {}", summary.skipped_for_size).yellow()
        );
    }
    if summary.excluded > 0 {
        eprintln!("   Excluded by pattern: {}", summary.excluded);
    }
    if summary.unreadable > 0 {
        eprintln!(
            "   {}",
            format!("Unreadable (placeholder written): {}", summary.unreadable).yellow()
        );
    }
    if summary.lossy > 0 {
        eprintln!("   Lossy UTF-8 decodes: {}", summary.lossy);
    }
    if summary.has_tree {
        eprintln!("   Directory tree: included");
    }
    eprintln!("   Size: {}", format_bytes(summary.bytes_written));
    eprintln!("   Tokens: {} (model: {})", summary.tokens, model);
    eprintln!(
        "{}",
        format!("Flattened code written to {}", summary.output.display()).green()
    );
}
