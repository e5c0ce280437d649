//! File reading
//!
//! Content is decoded as UTF-8; undecodable bytes are replaced rather than
//! failing the file. Anything else (permissions, a file deleted between
//! listing and reading) comes back as a `ReadError` for the renderer to show.

use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::core::error::ReadError;
use crate::core::model::{Content, FileCandidate};

/// Read a candidate's content
pub fn read_candidate(candidate: &FileCandidate) -> Result<Content, ReadError> {
    read_text_lossy(&candidate.absolute_path)
}

/// Read a file as text, replacing invalid UTF-8 sequences
pub fn read_text_lossy(path: &Path) -> Result<Content, ReadError> {
    let bytes = read_file_bytes(path)?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(Content::new(text)),
        Err(err) => {
            let text = String::from_utf8_lossy(err.as_bytes()).into_owned();
            Ok(Content::lossy(text))
        }
    }
}

fn read_file_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = fs::File::open(path)?;
    let capacity = file.metadata().map(|m| m.len() as usize).unwrap_or(0);

    let mut reader = BufReader::new(file);
    let mut buffer = Vec::with_capacity(capacity);
    reader.read_to_end(&mut buffer)?;

    Ok(buffer)
}
