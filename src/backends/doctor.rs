//! Doctor - Collaborator checking

use anyhow::Result;
use colored::Colorize;

use crate::backends::git::is_git_available;
use crate::backends::tree::is_tree_available;

/// Availability of an external collaborator
#[derive(Debug, Clone)]
pub struct DependencyStatus {
    pub name: String,
    pub available: bool,
    pub used_by: String,
    pub notes: Option<String>,
}

impl DependencyStatus {
    /// One console line describing this dependency
    pub fn describe(&self) -> String {
        let status = if self.available {
            "✓".green()
        } else {
            "✗".yellow()
        };
        let found = if self.available { "found" } else { "not found" };

        let mut line = format!(
            "{} {} (optional, used by {}) - {}",
            status, self.name, self.used_by, found
        );
        if let (false, Some(notes)) = (self.available, &self.notes) {
            line.push_str(&format!("\n  Note: {}", notes));
        }
        line
    }
}

/// Check all collaborators
pub fn check_dependencies() -> Vec<DependencyStatus> {
    vec![
        DependencyStatus {
            name: "git".to_string(),
            available: is_git_available(),
            used_by: "--source git".to_string(),
            notes: Some("Install git, or use the default --source walk".to_string()),
        },
        DependencyStatus {
            name: "tree".to_string(),
            available: is_tree_available(),
            used_by: "--tree command".to_string(),
            notes: Some(
                "Install: brew install tree / apt install tree, or use --tree builtin".to_string(),
            ),
        },
    ]
}

/// Run the doctor command
pub fn run_doctor() -> Result<()> {
    let deps = check_dependencies();

    for dep in &deps {
        println!("{}", dep.describe());
    }

    if deps.iter().any(|d| !d.available) {
        eprintln!("\n{}", "⚠️  Some optional collaborators are missing; output may be degraded.".yellow());
    }

    Ok(())
}
