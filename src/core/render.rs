//! Renderer module
//!
//! Renders a RenderedDocument to plain text or Markdown. Rendering is pure:
//! the same document always produces the same bytes.

use crate::core::model::{Entry, RenderedDocument};

/// Width of the separator line in plain output
pub const SEPARATOR_WIDTH: usize = 80;

/// Output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Separator-delimited file dumps
    #[default]
    Plain,
    /// Title, optional tree, one fenced block per file
    Markdown,
}

impl OutputStyle {
    /// Whether this style has a place for the directory tree
    pub fn wants_tree(&self) -> bool {
        matches!(self, OutputStyle::Markdown)
    }
}

impl std::str::FromStr for OutputStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(OutputStyle::Plain),
            "md" | "markdown" => Ok(OutputStyle::Markdown),
            _ => Err(format!("Unknown style: {}", s)),
        }
    }
}

/// Renderer for flattened documents
pub struct Renderer {
    style: OutputStyle,
}

impl Renderer {
    pub fn new(style: OutputStyle) -> Self {
        Self { style }
    }

    /// Render a document to a string
    pub fn render(&self, doc: &RenderedDocument) -> String {
        match self.style {
            OutputStyle::Plain => self.render_plain(doc),
            OutputStyle::Markdown => self.render_markdown(doc),
        }
    }

    fn render_plain(&self, doc: &RenderedDocument) -> String {
        let separator = "=".repeat(SEPARATOR_WIDTH);

        doc.entries
            .iter()
            .map(|entry| {
                let mut block = String::new();
                block.push_str(&separator);
                block.push_str(&format!("\n# File: {}\n", entry.path));
                block.push_str(&separator);
                block.push('\n');

                let body = entry_body(entry);
                block.push_str(&body);
                if !body.ends_with('\n') {
                    block.push('\n');
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_markdown(&self, doc: &RenderedDocument) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", doc.title));

        if let Some(tree) = &doc.tree {
            output.push_str("## Directory Structure\n\n");
            push_fenced(&mut output, "", tree);
            output.push('\n');
        }

        output.push_str("## Files\n\n");
        if doc.entries.is_empty() {
            output.push_str("_No files matched the selection rules._\n");
            return output;
        }

        for entry in &doc.entries {
            output.push_str(&format!("### `{}`\n\n", entry.path));
            match &entry.content {
                Ok(content) => {
                    if content.lossy {
                        output.push_str("> Note: invalid UTF-8 bytes were replaced\n\n");
                    }
                    push_fenced(&mut output, entry.language, &content.text);
                }
                Err(err) => {
                    output.push_str(&format!("> {}\n", err.placeholder()));
                }
            }
            output.push('\n');
        }

        // Exactly one trailing newline
        let trimmed = output.trim_end_matches('\n').len();
        output.truncate(trimmed);
        output.push('\n');
        output
    }
}

/// Text placed under an entry header: the content or its placeholder
fn entry_body(entry: &Entry) -> String {
    match &entry.content {
        Ok(content) => content.text.clone(),
        Err(err) => err.placeholder(),
    }
}

/// Append a fenced block long enough that `body` cannot close it early
fn push_fenced(output: &mut String, language: &str, body: &str) {
    let fence = "`".repeat(fence_len(body));
    output.push_str(&fence);
    output.push_str(language);
    output.push('\n');
    output.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(&fence);
    output.push('\n');
}

fn fence_len(body: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for c in body.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    (longest + 1).max(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ReadError;
    use crate::core::model::Content;
    use std::io;

    fn entry(path: &str, text: &str, language: &'static str) -> Entry {
        Entry {
            path: path.to_string(),
            content: Ok(Content::new(text)),
            language,
        }
    }

    fn sample_doc() -> RenderedDocument {
        RenderedDocument {
            title: "demo".to_string(),
            tree: None,
            entries: vec![
                entry("a.py", "print('a')\n", "python"),
                entry("pkg/b.py", "print('b')", "python"),
            ],
        }
    }

    #[test]
    fn test_render_plain_layout() {
        let output = Renderer::new(OutputStyle::Plain).render(&sample_doc());
        let sep = "=".repeat(SEPARATOR_WIDTH);
        let expected = format!(
            "{sep}\n# File: a.py\n{sep}\nprint('a')\n\n{sep}\n# File: pkg/b.py\n{sep}\nprint('b')\n"
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn test_render_plain_empty() {
        let output = Renderer::new(OutputStyle::Plain).render(&RenderedDocument::default());
        assert!(output.is_empty());
    }

    #[test]
    fn test_render_plain_ignores_tree() {
        let mut doc = sample_doc();
        doc.tree = Some("tree text".to_string());
        let output = Renderer::new(OutputStyle::Plain).render(&doc);
        assert!(!output.contains("tree text"));
    }

    #[test]
    fn test_render_plain_placeholder_for_unreadable() {
        let doc = RenderedDocument {
            title: "demo".to_string(),
            tree: None,
            entries: vec![Entry {
                path: "secret.py".to_string(),
                content: Err(ReadError::from(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "Permission denied",
                ))),
                language: "python",
            }],
        };
        let output = Renderer::new(OutputStyle::Plain).render(&doc);
        assert!(output.contains("# File: secret.py"));
        assert!(output.contains("[Could not read file: Permission denied]"));
    }

    #[test]
    fn test_render_markdown_layout() {
        let mut doc = sample_doc();
        doc.tree = Some(".\n├── a.py\n└── pkg\n    └── b.py".to_string());
        let output = Renderer::new(OutputStyle::Markdown).render(&doc);

        assert!(output.starts_with("# demo\n\n## Directory Structure\n\n```\n.\n"));
        assert!(output.contains("### `a.py`\n\n```python\nprint('a')\n```\n"));
        assert!(output.contains("### `pkg/b.py`\n\n```python\nprint('b')\n```\n"));
        assert!(output.ends_with("```\n"));
        assert!(!output.ends_with("\n\n"));
    }

    #[test]
    fn test_render_markdown_without_tree() {
        let output = Renderer::new(OutputStyle::Markdown).render(&sample_doc());
        assert!(!output.contains("## Directory Structure"));
        assert!(output.contains("## Files"));
    }

    #[test]
    fn test_render_markdown_empty() {
        let doc = RenderedDocument {
            title: "empty".to_string(),
            ..Default::default()
        };
        let output = Renderer::new(OutputStyle::Markdown).render(&doc);
        assert!(output.contains("No files matched"));
    }

    #[test]
    fn test_render_markdown_lengthens_fence() {
        let doc = RenderedDocument {
            title: "docs".to_string(),
            tree: None,
            entries: vec![entry("README.md", "```rust\nfn main() {}\n```\n", "markdown")],
        };
        let output = Renderer::new(OutputStyle::Markdown).render(&doc);
        assert!(output.contains("````markdown\n```rust\n"));
        assert!(output.contains("```\n````\n"));
    }

    #[test]
    fn test_render_markdown_lossy_note() {
        let doc = RenderedDocument {
            title: "demo".to_string(),
            tree: None,
            entries: vec![Entry {
                path: "old.py".to_string(),
                content: Ok(Content::lossy("x = '\u{FFFD}'\n")),
                language: "python",
            }],
        };
        let output = Renderer::new(OutputStyle::Markdown).render(&doc);
        assert!(output.contains("invalid UTF-8 bytes were replaced"));
        assert!(output.contains("x = '\u{FFFD}'"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let doc = sample_doc();
        for style in [OutputStyle::Plain, OutputStyle::Markdown] {
            let renderer = Renderer::new(style);
            assert_eq!(renderer.render(&doc), renderer.render(&doc));
        }
    }

    #[test]
    fn test_output_style_parse() {
        assert_eq!("plain".parse::<OutputStyle>().unwrap(), OutputStyle::Plain);
        assert_eq!("MD".parse::<OutputStyle>().unwrap(), OutputStyle::Markdown);
        assert_eq!(
            "markdown".parse::<OutputStyle>().unwrap(),
            OutputStyle::Markdown
        );
        assert!("html".parse::<OutputStyle>().unwrap_err().contains("Unknown style"));
    }

    #[test]
    fn test_fence_len() {
        assert_eq!(fence_len("no ticks"), 3);
        assert_eq!(fence_len("``` inside"), 4);
        assert_eq!(fence_len("````` five"), 6);
    }
}
