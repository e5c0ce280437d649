//! Candidate collection
//!
//! Two sources feed the same inclusion predicate: a pruned filesystem walk
//! (walkdir, sorted by file name) and a tracked-file listing from an external
//! provider. Output order is the traversal or listing order.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::backends::git::FileListProvider;
use crate::core::error::FlattenError;
use crate::core::model::{Availability, Collection, FileCandidate};
use crate::core::paths::{join_normalized, make_relative};
use crate::core::policy::{InclusionPolicy, Verdict};
use crate::core::util::get_file_size;

/// Where candidate paths come from
#[derive(Clone, Copy)]
pub enum Source<'a> {
    /// Recursive walk of the root directory
    Walk,
    /// Paths reported by a version-control provider
    Tracked(&'a dyn FileListProvider),
}

/// Collect candidates under `root` according to `policy`
pub fn collect(
    root: &Path,
    policy: &InclusionPolicy,
    source: Source<'_>,
) -> Result<Collection, FlattenError> {
    if !root.is_dir() {
        return Err(FlattenError::RootNotFound(root.to_path_buf()));
    }

    debug!(
        "Selecting extensions {:?} with {} exclude pattern(s)",
        policy.include_extensions(),
        policy.exclude_patterns().len()
    );

    match source {
        Source::Walk => Ok(walk_files(root, policy)),
        Source::Tracked(provider) => tracked_files(root, policy, provider),
    }
}

/// Walk the filesystem, pruning excluded directories before descending
pub fn walk_files(root: &Path, policy: &InclusionPolicy) -> Collection {
    let mut collection = Collection::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let pruned = policy.is_excluded_dir(&entry.file_name().to_string_lossy());
            if pruned {
                debug!("Pruned directory: {}", entry.path().display());
            }
            !pruned
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        let file_type = entry.file_type();
        let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        let relative = match make_relative(entry.path(), root) {
            Some(r) => r,
            None => continue,
        };

        if !select(policy, &relative, &mut collection) {
            continue;
        }

        let size = match get_file_size(entry.path()) {
            Ok(size) => size,
            Err(err) => {
                warn!("Cannot stat {}: {}", relative, err);
                0
            }
        };

        if gate_size(policy, &relative, size, &mut collection) {
            let candidate = FileCandidate::new(relative, entry.path(), size);
            collection.candidates.push(candidate);
        }
    }

    collection
}

/// Filter the provider's listing; fails if the provider is unavailable
pub fn tracked_files(
    root: &Path,
    policy: &InclusionPolicy,
    provider: &dyn FileListProvider,
) -> Result<Collection, FlattenError> {
    let listed = match provider.list_files(root) {
        Availability::Available(paths) => paths,
        Availability::Unavailable(reason) => {
            return Err(FlattenError::SourceUnavailable { reason });
        }
    };

    let mut collection = Collection::default();
    let mut seen = HashSet::new();

    for raw in listed {
        let relative = raw.trim_start_matches("./").to_string();
        if relative.is_empty() {
            continue;
        }
        if !seen.insert(relative.clone()) {
            debug!("Duplicate listing for {}", relative);
            continue;
        }

        if !select(policy, &relative, &mut collection) {
            continue;
        }

        let absolute = join_normalized(root, &relative);
        let size = match fs::metadata(&absolute) {
            Ok(meta) if meta.is_dir() => {
                debug!("Skipping {}: not a regular file", relative);
                continue;
            }
            Ok(meta) => meta.len(),
            Err(err) => {
                // Deleted from the worktree but still tracked; the read step reports it
                warn!("Cannot stat {}: {}", relative, err);
                0
            }
        };

        if gate_size(policy, &relative, size, &mut collection) {
            collection
                .candidates
                .push(FileCandidate::new(relative, absolute, size));
        }
    }

    Ok(collection)
}

/// Inclusion predicate with logging and counters
fn select(policy: &InclusionPolicy, relative: &str, collection: &mut Collection) -> bool {
    match policy.check(relative) {
        Verdict::Include => true,
        Verdict::Excluded => {
            debug!("Excluded by pattern: {}", relative);
            collection.excluded += 1;
            false
        }
        Verdict::ExcludedDir => {
            debug!("Excluded by directory: {}", relative);
            false
        }
        Verdict::NotSelected => {
            debug!("Not selected: {}", relative);
            false
        }
    }
}

/// Size gate; oversized files are counted, not treated as errors
fn gate_size(
    policy: &InclusionPolicy,
    relative: &str,
    size: u64,
    collection: &mut Collection,
) -> bool {
    if policy.within_size_limit(size) {
        return true;
    }

    warn!(
        "Skipping {} for size ({} bytes > {} bytes)",
        relative,
        size,
        policy.max_file_size().unwrap_or_default()
    );
    collection.skipped_for_size += 1;
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    struct FixedList(Availability<Vec<String>>);

    impl FileListProvider for FixedList {
        fn list_files(&self, _root: &Path) -> Availability<Vec<String>> {
            self.0.clone()
        }
    }

    fn write_file(root: &Path, relative: &str, content: &[u8]) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn paths(collection: &Collection) -> Vec<&str> {
        collection
            .candidates
            .iter()
            .map(|c| c.relative_path.as_str())
            .collect()
    }

    #[test]
    fn test_walk_selects_extension_and_prunes_dirs() {
        let temp = tempdir().unwrap();
        write_file(temp.path(), "a.py", &[b'x'; 50]);
        write_file(temp.path(), "b.png", b"\x89PNG");
        write_file(temp.path(), "node_modules/c.py", b"print('c')");

        let policy = InclusionPolicy::builder()
            .include_extensions([".py"])
            .exclude_dirs(["node_modules"])
            .build()
            .unwrap();

        let collection = collect(temp.path(), &policy, Source::Walk).unwrap();
        assert_eq!(paths(&collection), vec!["a.py"]);
        assert_eq!(collection.candidates[0].size_bytes, 50);
    }

    #[test]
    fn test_walk_order_is_lexical() {
        let temp = tempdir().unwrap();
        write_file(temp.path(), "z.py", b"z");
        write_file(temp.path(), "pkg/m.py", b"m");
        write_file(temp.path(), "a.py", b"a");
        write_file(temp.path(), "pkg/b.py", b"b");

        let collection = walk_files(temp.path(), &InclusionPolicy::default());
        assert_eq!(paths(&collection), vec!["a.py", "pkg/b.py", "pkg/m.py", "z.py"]);
    }

    #[test]
    fn test_walk_nested_excluded_dir_is_pruned() {
        let temp = tempdir().unwrap();
        write_file(temp.path(), "app/__pycache__/mod.py", b"cached");
        write_file(temp.path(), "app/mod.py", b"real");

        let collection = walk_files(temp.path(), &InclusionPolicy::default());
        assert_eq!(paths(&collection), vec!["app/mod.py"]);
    }

    #[test]
    fn test_walk_prunes_exact_names_only() {
        let temp = tempdir().unwrap();
        write_file(temp.path(), "venvs/tool.py", b"kept");
        write_file(temp.path(), "venv/lib.py", b"pruned");

        let collection = walk_files(temp.path(), &InclusionPolicy::default());
        assert_eq!(paths(&collection), vec!["venvs/tool.py"]);
    }

    #[test]
    fn test_walk_counts_pattern_exclusions() {
        let temp = tempdir().unwrap();
        write_file(temp.path(), "src/a.py", b"a");
        write_file(temp.path(), "tests/test_a.py", b"t");

        let policy = InclusionPolicy::builder()
            .exclude_patterns(["tests/*"])
            .build()
            .unwrap();
        let collection = walk_files(temp.path(), &policy);
        assert_eq!(paths(&collection), vec!["src/a.py"]);
        assert_eq!(collection.excluded, 1);
    }

    #[test]
    fn test_size_boundary() {
        let temp = tempdir().unwrap();
        write_file(temp.path(), "at_limit.py", &[b'a'; 100]);
        write_file(temp.path(), "over_limit.py", &[b'b'; 101]);

        let policy = InclusionPolicy::builder()
            .max_file_size(Some(100))
            .build()
            .unwrap();
        let collection = walk_files(temp.path(), &policy);
        assert_eq!(paths(&collection), vec!["at_limit.py"]);
        assert_eq!(collection.skipped_for_size, 1);
    }

    #[test]
    fn test_collect_missing_root() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("nope");
        let err = collect(&missing, &InclusionPolicy::default(), Source::Walk).unwrap_err();
        assert!(matches!(err, FlattenError::RootNotFound(_)));
    }

    #[test]
    fn test_tracked_keeps_listing_order_and_dedups() {
        let temp = tempdir().unwrap();
        write_file(temp.path(), "b.py", b"b");
        write_file(temp.path(), "a.py", b"a");
        write_file(temp.path(), "README.md", b"readme");

        let provider = FixedList(Availability::Available(vec![
            "b.py".to_string(),
            "README.md".to_string(),
            "a.py".to_string(),
            "b.py".to_string(),
        ]));

        let collection =
            collect(temp.path(), &InclusionPolicy::default(), Source::Tracked(&provider)).unwrap();
        assert_eq!(paths(&collection), vec!["b.py", "a.py"]);
    }

    #[test]
    fn test_tracked_applies_excluded_dirs() {
        let temp = tempdir().unwrap();
        write_file(temp.path(), "venv/lib/site.py", b"vendored");
        write_file(temp.path(), "main.py", b"main");

        let provider = FixedList(Availability::Available(vec![
            "venv/lib/site.py".to_string(),
            "main.py".to_string(),
        ]));
        let collection =
            tracked_files(temp.path(), &InclusionPolicy::default(), &provider).unwrap();
        assert_eq!(paths(&collection), vec!["main.py"]);
    }

    #[test]
    fn test_tracked_missing_file_stays_candidate() {
        let temp = tempdir().unwrap();
        let provider = FixedList(Availability::Available(vec!["deleted.py".to_string()]));

        let collection =
            tracked_files(temp.path(), &InclusionPolicy::default(), &provider).unwrap();
        assert_eq!(paths(&collection), vec!["deleted.py"]);
        assert_eq!(collection.candidates[0].size_bytes, 0);
    }

    #[test]
    fn test_tracked_skips_directories() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("vendor.py")).unwrap();
        let provider = FixedList(Availability::Available(vec!["vendor.py".to_string()]));

        let collection =
            tracked_files(temp.path(), &InclusionPolicy::default(), &provider).unwrap();
        assert!(collection.is_empty());
    }

    #[test]
    fn test_tracked_unavailable_is_an_error() {
        let temp = tempdir().unwrap();
        write_file(temp.path(), "a.py", b"a");
        let provider = FixedList(Availability::Unavailable(
            "fatal: not a git repository".to_string(),
        ));

        let err = collect(temp.path(), &InclusionPolicy::default(), Source::Tracked(&provider))
            .unwrap_err();
        match err {
            FlattenError::SourceUnavailable { reason } => {
                assert!(reason.contains("not a git repository"))
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }
}
