//! Flows module - Commands built from collection, reading and rendering
//!
//! Provides:
//! - select: Source choice, fallback and output-file skipping
//! - flatten: Render the selected files into one output document
//! - list: Print the selected files without reading them

pub mod flatten;
pub mod list;
pub mod select;
