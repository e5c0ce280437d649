//! Backends module - Filesystem traversal and external tool integrations
//!
//! Provides:
//! - collect: Candidate collection (walkdir walk or tracked-file listing)
//! - git: `git ls-files` provider
//! - tree: `tree` command and builtin tree providers
//! - doctor: Collaborator checking

pub mod collect;
pub mod doctor;
pub mod git;
pub mod tree;
