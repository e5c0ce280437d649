//! Data model shared by collection, reading and rendering

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::error::ReadError;

/// A file selected for the output document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCandidate {
    /// Path relative to root, using '/' as separator
    pub relative_path: String,

    /// Path used to read the file
    pub absolute_path: PathBuf,

    /// File size in bytes at collection time
    pub size_bytes: u64,
}

impl FileCandidate {
    pub fn new(
        relative_path: impl Into<String>,
        absolute_path: impl Into<PathBuf>,
        size_bytes: u64,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            absolute_path: absolute_path.into(),
            size_bytes,
        }
    }
}

/// Result of collecting candidates, with the counters the run reports
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Candidates in output order
    pub candidates: Vec<FileCandidate>,

    /// Files rejected because they exceed the size limit
    pub skipped_for_size: usize,

    /// Files rejected by an exclusion pattern
    pub excluded: usize,
}

impl Collection {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Decoded text of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub text: String,

    /// Undecodable bytes were replaced with U+FFFD
    pub lossy: bool,
}

impl Content {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lossy: false,
        }
    }

    pub fn lossy(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lossy: true,
        }
    }
}

/// One file section of the rendered document
#[derive(Debug)]
pub struct Entry {
    pub path: String,
    pub content: Result<Content, ReadError>,
    pub language: &'static str,
}

/// Everything the renderer needs; rendering performs no I/O
#[derive(Debug, Default)]
pub struct RenderedDocument {
    pub title: String,
    pub tree: Option<String>,
    pub entries: Vec<Entry>,
}

/// Output of an external collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability<T> {
    Available(T),
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_serializes_relative_path() {
        let candidate = FileCandidate::new("src/a.py", "/project/src/a.py", 50);
        let json = serde_json::to_string(&candidate).unwrap();
        assert!(json.contains("\"relative_path\":\"src/a.py\""));
        assert!(json.contains("\"size_bytes\":50"));
    }

    #[test]
    fn test_content_constructors() {
        assert!(!Content::new("x").lossy);
        assert!(Content::lossy("x").lossy);
    }

    #[test]
    fn test_collection_len() {
        let mut collection = Collection::default();
        assert!(collection.is_empty());
        collection
            .candidates
            .push(FileCandidate::new("a.py", "a.py", 1));
        assert_eq!(collection.len(), 1);
    }
}
