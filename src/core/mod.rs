//! Core module - Data structures and pure building blocks
//!
//! This module provides:
//! - The data model (candidates, contents, rendered documents)
//! - Error taxonomy
//! - Inclusion policy and path helpers
//! - File reading with lossy decoding
//! - Rendering to plain text and Markdown
//! - Token counting for LLM context budgeting

pub mod error;
pub mod file_reader;
pub mod language;
pub mod model;
pub mod paths;
pub mod policy;
pub mod render;
pub mod tokenizer;
pub mod util;
