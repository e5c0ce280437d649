//! Directory tree diagrams for the Markdown header
//!
//! The `tree` command is an optional collaborator; when it is missing the
//! document just loses its tree section. The builtin variant draws the
//! diagram from the collected candidates and never fails.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use crate::core::model::{Availability, FileCandidate};
use crate::core::policy::InclusionPolicy;
use crate::core::util::command_exists;

/// Capability: produce a human-readable directory diagram
pub trait TreeProvider {
    fn render_tree(
        &self,
        root: &Path,
        policy: &InclusionPolicy,
        candidates: &[FileCandidate],
    ) -> Availability<String>;
}

/// Which tree provider to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeMode {
    /// External `tree` command
    #[default]
    Command,
    /// Drawn in-process from the collected files
    Builtin,
    /// No tree section
    None,
}

impl TreeMode {
    pub fn provider(&self) -> Option<Box<dyn TreeProvider>> {
        match self {
            TreeMode::Command => Some(Box::new(TreeCommand)),
            TreeMode::Builtin => Some(Box::new(BuiltinTree)),
            TreeMode::None => None,
        }
    }
}

impl std::str::FromStr for TreeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "command" | "cmd" => Ok(TreeMode::Command),
            "builtin" => Ok(TreeMode::Builtin),
            "none" | "off" => Ok(TreeMode::None),
            _ => Err(format!("Unknown tree mode: {}", s)),
        }
    }
}

/// Check if the tree command is available
pub fn is_tree_available() -> bool {
    command_exists("tree")
}

/// Runs `tree` in the root, hiding excluded directories
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeCommand;

impl TreeProvider for TreeCommand {
    fn render_tree(
        &self,
        root: &Path,
        policy: &InclusionPolicy,
        _candidates: &[FileCandidate],
    ) -> Availability<String> {
        let mut cmd = Command::new("tree");
        cmd.current_dir(root).arg("-a").arg("--noreport");

        let ignored: Vec<&str> = policy.exclude_dirs().iter().map(String::as_str).collect();
        if !ignored.is_empty() {
            cmd.arg("-I").arg(ignored.join("|"));
        }
        cmd.arg(".");

        let output = match cmd.output() {
            Ok(o) => o,
            Err(err) => return Availability::Unavailable(format!("cannot run tree: {}", err)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Availability::Unavailable(format!(
                "tree exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Availability::Available(stdout.trim_end().to_string())
    }
}

/// Draws the collected files as an ASCII tree
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTree;

impl TreeProvider for BuiltinTree {
    fn render_tree(
        &self,
        _root: &Path,
        _policy: &InclusionPolicy,
        candidates: &[FileCandidate],
    ) -> Availability<String> {
        let paths: Vec<&str> = candidates.iter().map(|c| c.relative_path.as_str()).collect();
        Availability::Available(draw_tree(&paths))
    }
}

#[derive(Default)]
struct Node {
    children: BTreeMap<String, Node>,
}

/// Draw '/'-separated paths as a tree rooted at `.`
pub fn draw_tree(paths: &[&str]) -> String {
    let mut root = Node::default();
    for path in paths {
        let mut node = &mut root;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            node = node.children.entry(part.to_string()).or_default();
        }
    }

    let mut lines = vec![".".to_string()];
    draw_children(&root, "", &mut lines);
    lines.join("\n")
}

fn draw_children(node: &Node, prefix: &str, lines: &mut Vec<String>) {
    let count = node.children.len();
    for (idx, (name, child)) in node.children.iter().enumerate() {
        let last = idx + 1 == count;
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        lines.push(format!("{}{}{}", prefix, branch, name));
        draw_children(child, &format!("{}{}", prefix, indent), lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_tree() {
        let tree = draw_tree(&["setup.py", "pkg/b.py", "pkg/a.py", "docs/conf.py"]);
        let expected = "\
.
├── docs
│   └── conf.py
├── pkg
│   ├── a.py
│   └── b.py
└── setup.py";
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_draw_tree_empty() {
        assert_eq!(draw_tree(&[]), ".");
    }

    #[test]
    fn test_builtin_provider_lists_every_candidate() {
        let candidates = vec![
            FileCandidate::new("a.py", "/p/a.py", 1),
            FileCandidate::new("lib/deep/x.py", "/p/lib/deep/x.py", 1),
        ];
        let tree = BuiltinTree
            .render_tree(Path::new("/p"), &InclusionPolicy::default(), &candidates);
        let Availability::Available(tree) = tree else {
            panic!("builtin tree is always available");
        };
        assert!(tree.contains("a.py"));
        assert!(tree.contains("        └── x.py"));
    }

    #[test]
    fn test_tree_mode_parse() {
        assert_eq!("command".parse::<TreeMode>().unwrap(), TreeMode::Command);
        assert_eq!("BUILTIN".parse::<TreeMode>().unwrap(), TreeMode::Builtin);
        assert_eq!("none".parse::<TreeMode>().unwrap(), TreeMode::None);
        assert!("forest".parse::<TreeMode>().is_err());
    }

    #[test]
    fn test_tree_mode_provider() {
        assert!(TreeMode::None.provider().is_none());
        assert!(TreeMode::Builtin.provider().is_some());
    }

    #[test]
    fn test_tree_command_when_available() {
        if !is_tree_available() {
            return;
        }
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp.path().join("__pycache__")).unwrap();
        std::fs::write(temp.path().join("main.py"), "").unwrap();

        let tree = TreeCommand
            .render_tree(temp.path(), &InclusionPolicy::default(), &[]);
        let tree = match tree {
            Availability::Available(tree) => tree,
            Availability::Unavailable(reason) => panic!("tree command failed: {}", reason),
        };
        assert!(tree.contains("main.py"));
        assert!(!tree.contains("__pycache__"));
    }
}
