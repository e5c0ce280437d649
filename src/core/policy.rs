//! Inclusion policy - which files end up in the output
//!
//! The policy is built once at process start and never mutated. Exclusion
//! globs use gitignore semantics: `**` is supported, a pattern containing
//! `/` is anchored at the root, and a pattern matching a parent directory
//! excludes everything beneath it.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::BTreeSet;
use std::path::Path;

use crate::core::error::FlattenError;
use crate::core::paths::{extension, file_name, parent_components};

/// Extensions included when none are given
pub const DEFAULT_INCLUDE_EXTENSIONS: &[&str] = &["py"];

/// Directories pruned when none are given
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    ".venv",
    "venv",
    "env",
    ".mypy_cache",
    ".pytest_cache",
];

/// Extension-less build/config files accepted regardless of extension set
pub const KNOWN_BARE_FILENAMES: &[&str] = &[
    "Makefile",
    "GNUmakefile",
    "Dockerfile",
    "Containerfile",
    "Justfile",
    "justfile",
    "Rakefile",
    "Gemfile",
    "Procfile",
    "Vagrantfile",
    "Jenkinsfile",
    "BUILD",
    "WORKSPACE",
];

/// Outcome of the inclusion predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Include,
    /// Matched an exclusion pattern
    Excluded,
    /// Lives under an excluded directory
    ExcludedDir,
    /// Extension not in the include set and not a known bare filename
    NotSelected,
}

/// Immutable selection rules for one run
#[derive(Debug, Clone)]
pub struct InclusionPolicy {
    include_extensions: BTreeSet<String>,
    exclude_dirs: BTreeSet<String>,
    exclude_patterns: Vec<String>,
    matcher: Gitignore,
    max_file_size: Option<u64>,
}

impl InclusionPolicy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    pub fn include_extensions(&self) -> &BTreeSet<String> {
        &self.include_extensions
    }

    pub fn exclude_dirs(&self) -> &BTreeSet<String> {
        &self.exclude_dirs
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    pub fn max_file_size(&self) -> Option<u64> {
        self.max_file_size
    }

    /// Whether a directory with this name is pruned from traversal
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.contains(name)
    }

    /// Apply the inclusion predicate to a root-relative path
    pub fn check(&self, relative: &str) -> Verdict {
        if self.matches_exclude_pattern(relative) {
            return Verdict::Excluded;
        }

        if parent_components(relative).any(|dir| self.is_excluded_dir(dir)) {
            return Verdict::ExcludedDir;
        }

        if let Some(ext) = extension(relative) {
            if self.include_extensions.contains(&ext) {
                return Verdict::Include;
            }
        }

        if KNOWN_BARE_FILENAMES.contains(&file_name(relative)) {
            return Verdict::Include;
        }

        Verdict::NotSelected
    }

    /// Whether a file of this size passes the size gate (limit is inclusive)
    pub fn within_size_limit(&self, size: u64) -> bool {
        self.max_file_size.map_or(true, |max| size <= max)
    }

    fn matches_exclude_pattern(&self, relative: &str) -> bool {
        if self.exclude_patterns.is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(Path::new(relative), false)
            .is_ignore()
    }
}

impl Default for InclusionPolicy {
    fn default() -> Self {
        // The default pattern set is empty, so building cannot fail
        PolicyBuilder::default()
            .build()
            .unwrap_or_else(|_| unreachable!("empty pattern set always compiles"))
    }
}

/// Builder collecting policy options before compiling the glob matcher
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    include_extensions: BTreeSet<String>,
    exclude_dirs: BTreeSet<String>,
    exclude_patterns: Vec<String>,
    max_file_size: Option<u64>,
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self {
            include_extensions: DEFAULT_INCLUDE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|d| d.to_string()).collect(),
            exclude_patterns: Vec::new(),
            max_file_size: None,
        }
    }
}

impl PolicyBuilder {
    /// Replace the extension set; `.PY`, `py` and `.py` are equivalent
    pub fn include_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.include_extensions = exts
            .into_iter()
            .map(|e| normalize_extension(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Replace the excluded directory names
    pub fn exclude_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_dirs = dirs
            .into_iter()
            .map(|d| d.as_ref().trim_matches('/').to_string())
            .filter(|d| !d.is_empty())
            .collect();
        self
    }

    /// Add directory names on top of the current set
    pub fn add_exclude_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_dirs.extend(
            dirs.into_iter()
                .map(|d| d.as_ref().trim_matches('/').to_string())
                .filter(|d| !d.is_empty()),
        );
        self
    }

    pub fn exclude_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_file_size(mut self, max: Option<u64>) -> Self {
        self.max_file_size = max;
        self
    }

    /// Compile the exclusion globs and freeze the policy
    pub fn build(self) -> Result<InclusionPolicy, FlattenError> {
        let mut builder = GitignoreBuilder::new("");
        for pattern in &self.exclude_patterns {
            builder
                .add_line(None, pattern)
                .map_err(|source| FlattenError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
        }
        let matcher = builder
            .build()
            .map_err(|source| FlattenError::InvalidPattern {
                pattern: self.exclude_patterns.join(", "),
                source,
            })?;

        Ok(InclusionPolicy {
            include_extensions: self.include_extensions,
            exclude_dirs: self.exclude_dirs,
            exclude_patterns: self.exclude_patterns,
            matcher,
            max_file_size: self.max_file_size,
        })
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}
