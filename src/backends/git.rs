//! git integration
//!
//! Lists tracked files with `git ls-files -z`, so names are never C-quoted.
//! Failure (git missing, not a
//! repository) is reported as `Unavailable`; deciding what to do about it is
//! left to the caller.

use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::core::model::Availability;
use crate::core::util::command_exists;

/// Capability: list files known to version control, relative to the root
pub trait FileListProvider {
    fn list_files(&self, root: &Path) -> Availability<Vec<String>>;
}

/// `git ls-files` in the root directory
#[derive(Debug, Clone, Copy, Default)]
pub struct GitLsFiles;

/// Check if git is available
pub fn is_git_available() -> bool {
    command_exists("git")
}

impl FileListProvider for GitLsFiles {
    fn list_files(&self, root: &Path) -> Availability<Vec<String>> {
        let output = Command::new("git")
            .current_dir(root)
            .args(["-c", "core.quotepath=off", "ls-files", "-z"])
            .output();

        let output = match output {
            Ok(o) => o,
            Err(err) => return Availability::Unavailable(format!("cannot run git: {}", err)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => format!("git ls-files exited with {}", output.status),
                msg => msg.to_string(),
            };
            return Availability::Unavailable(reason);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let paths = parse_listing(&stdout);
        debug!("git ls-files reported {} paths", paths.len());
        Availability::Available(paths)
    }
}

/// Split NUL-separated listing output into paths
pub fn parse_listing(stdout: &str) -> Vec<String> {
    stdout
        .split('\0')
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect()
}
