//! Error taxonomy
//!
//! Per-file problems are recoverable and travel as values (`ReadError`);
//! run-level problems (`FlattenError`) abort the command before or instead of
//! writing the output file.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single candidate could not be read
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("{0}")]
    Io(#[from] io::Error),
}

impl ReadError {
    /// Placeholder text shown in place of the file content
    pub fn placeholder(&self) -> String {
        format!("[Could not read file: {}]", self)
    }
}

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("invalid exclude pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: ignore::Error,
    },

    #[error("tracked-file source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    #[error("failed to write output file {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FlattenError {
    /// Whether the run may continue by walking the filesystem instead
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, FlattenError::SourceUnavailable { .. })
    }
}
