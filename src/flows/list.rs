//! List flow - Print the collected candidates without reading them

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;

use crate::core::model::FileCandidate;
use crate::flows::select::{gather, Selection};

/// How `list` prints candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFormat {
    /// One JSON object per line
    #[default]
    Jsonl,
    /// A single JSON array
    Json,
    /// Bare relative paths
    Paths,
}

impl std::str::FromStr for ListFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(ListFormat::Jsonl),
            "json" => Ok(ListFormat::Json),
            "paths" | "path" => Ok(ListFormat::Paths),
            _ => Err(format!("Unknown list format: {}", s)),
        }
    }
}

/// Format candidates as the text `list` prints
pub fn format_candidates(
    candidates: &[FileCandidate],
    format: ListFormat,
    pretty: bool,
) -> Result<String> {
    let mut output = String::new();

    match format {
        ListFormat::Jsonl => {
            for candidate in candidates {
                let line = if pretty {
                    serde_json::to_string_pretty(candidate)
                } else {
                    serde_json::to_string(candidate)
                }
                .context("Failed to serialize candidate")?;
                output.push_str(&line);
                output.push('\n');
            }
        }
        ListFormat::Json => {
            let json = if pretty {
                serde_json::to_string_pretty(candidates)
            } else {
                serde_json::to_string(candidates)
            }
            .context("Failed to serialize candidates")?;
            output.push_str(&json);
            output.push('\n');
        }
        ListFormat::Paths => {
            for candidate in candidates {
                output.push_str(&candidate.relative_path);
                output.push('\n');
            }
        }
    }

    Ok(output)
}

/// Run the list command
pub fn run_list(
    root: &Path,
    selection: &Selection,
    format: ListFormat,
    pretty: bool,
) -> Result<()> {
    let collection = gather(root, selection, None)?;
    let output = format_candidates(&collection.candidates, format, pretty)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(output.as_bytes())
        .context("Failed to write candidate list")?;
    Ok(())
}
