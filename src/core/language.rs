//! Fence language tags for Markdown output

use crate::core::paths::{extension, file_name};

/// Tag used when the extension is absent or unknown
pub const DEFAULT_LANGUAGE: &str = "text";

/// Map a root-relative path to a Markdown fence language tag
pub fn language_for(relative: &str) -> &'static str {
    match file_name(relative) {
        "Makefile" | "GNUmakefile" => return "makefile",
        "Dockerfile" | "Containerfile" => return "dockerfile",
        "Justfile" | "justfile" => return "just",
        "Rakefile" | "Gemfile" | "Vagrantfile" => return "ruby",
        "Jenkinsfile" => return "groovy",
        "BUILD" | "WORKSPACE" => return "starlark",
        _ => {}
    }

    let Some(ext) = extension(relative) else {
        return DEFAULT_LANGUAGE;
    };

    match ext.as_str() {
        "py" | "pyi" | "pyw" => "python",
        "rs" => "rust",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "tsx",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "scala" => "scala",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => "cpp",
        "cs" => "csharp",
        "swift" => "swift",
        "rb" => "ruby",
        "php" => "php",
        "lua" => "lua",
        "pl" | "pm" => "perl",
        "r" => "r",
        "sh" | "bash" | "zsh" => "bash",
        "fish" => "fish",
        "ps1" => "powershell",
        "sql" => "sql",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "vue" => "vue",
        "svelte" => "svelte",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "xml" => "xml",
        "ini" | "cfg" => "ini",
        "md" | "markdown" => "markdown",
        "rst" => "rst",
        "tex" => "latex",
        "proto" => "protobuf",
        "graphql" | "gql" => "graphql",
        "dockerfile" => "dockerfile",
        "mk" => "makefile",
        "cmake" => "cmake",
        "gradle" => "groovy",
        "hs" => "haskell",
        "ml" | "mli" => "ocaml",
        "ex" | "exs" => "elixir",
        "erl" => "erlang",
        "clj" => "clojure",
        "dart" => "dart",
        "zig" => "zig",
        "nix" => "nix",
        "tf" => "hcl",
        "txt" => "text",
        _ => DEFAULT_LANGUAGE,
    }
}
