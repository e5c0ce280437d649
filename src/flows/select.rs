//! Candidate selection shared by `flatten` and `list`
//!
//! Wraps collection with the run-level decisions: which source to use,
//! whether a failed tracked-file listing may fall back to a walk, and keeping
//! the output file out of its own input.

use std::path::Path;
use tracing::{debug, warn};

use crate::backends::collect::{collect, Source};
use crate::backends::git::{FileListProvider, GitLsFiles};
use crate::core::error::FlattenError;
use crate::core::model::Collection;
use crate::core::paths::absolutize;
use crate::core::policy::InclusionPolicy;

/// Which collection source the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    #[default]
    Walk,
    Git,
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "walk" | "fs" => Ok(SourceKind::Walk),
            "git" | "tracked" => Ok(SourceKind::Git),
            _ => Err(format!("Unknown source: {}", s)),
        }
    }
}

/// Everything that decides which files are collected
#[derive(Debug, Clone)]
pub struct Selection {
    pub policy: InclusionPolicy,
    pub source: SourceKind,
    /// Walk the filesystem when the tracked-file listing is unavailable
    pub fallback_walk: bool,
}

/// Collect candidates using git for tracked-file mode
pub fn gather(
    root: &Path,
    selection: &Selection,
    skip: Option<&Path>,
) -> Result<Collection, FlattenError> {
    gather_with(root, selection, &GitLsFiles, skip)
}

/// Collect candidates with an explicit file-list provider
pub fn gather_with(
    root: &Path,
    selection: &Selection,
    provider: &dyn FileListProvider,
    skip: Option<&Path>,
) -> Result<Collection, FlattenError> {
    let source = match selection.source {
        SourceKind::Walk => Source::Walk,
        SourceKind::Git => Source::Tracked(provider),
    };

    let mut collection = match collect(root, &selection.policy, source) {
        Ok(collection) => collection,
        Err(err) if err.is_source_unavailable() && selection.fallback_walk => {
            warn!("{}; falling back to filesystem walk", err);
            collect(root, &selection.policy, Source::Walk)?
        }
        Err(err) => return Err(err),
    };

    if let Some(skip) = skip {
        let skip = absolutize(skip);
        collection.candidates.retain(|candidate| {
            if candidate.absolute_path.file_name() != skip.file_name() {
                return true;
            }
            let is_output = absolutize(&candidate.absolute_path) == skip;
            if is_output {
                debug!("Skipping output file {}", candidate.relative_path);
            }
            !is_output
        });
    }

    Ok(collection)
}
