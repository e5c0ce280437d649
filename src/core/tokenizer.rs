//! Token estimation for the flattened document
//!
//! The summary reports how many tokens the output costs so the user can tell
//! whether it fits a model's context window.

use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};

/// Encoding used to count tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenModel {
    /// cl100k_base (GPT-4, GPT-3.5-turbo; a close approximation for Claude)
    #[default]
    Cl100k,
    /// o200k_base (GPT-4o family)
    O200k,
    /// Character-class estimate, no BPE tables
    Heuristic,
}

impl TokenModel {
    pub fn available_models() -> &'static [&'static str] {
        &["cl100k", "o200k", "heuristic"]
    }

    fn bpe(&self) -> Option<&'static CoreBPE> {
        match self {
            TokenModel::Cl100k => CL100K_BPE.as_ref().ok(),
            TokenModel::O200k => O200K_BPE.as_ref().ok(),
            TokenModel::Heuristic => None,
        }
    }
}

impl fmt::Display for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenModel::Cl100k => "cl100k",
            TokenModel::O200k => "o200k",
            TokenModel::Heuristic => "heuristic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TokenModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" | "gpt4" | "gpt-4" | "claude" => Ok(TokenModel::Cl100k),
            "o200k" | "o200k_base" | "gpt4o" | "gpt-4o" => Ok(TokenModel::O200k),
            "heuristic" | "fast" => Ok(TokenModel::Heuristic),
            _ => Err(format!(
                "Unknown model: {}. Available: {}",
                s,
                TokenModel::available_models().join(", ")
            )),
        }
    }
}

static CL100K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| cl100k_base().map_err(|e| format!("Failed to load cl100k_base: {}", e)));

static O200K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| o200k_base().map_err(|e| format!("Failed to load o200k_base: {}", e)));

/// Count tokens; falls back to the heuristic if the encoding failed to load
pub fn count_tokens(text: &str, model: TokenModel) -> usize {
    if text.is_empty() {
        return 0;
    }

    match model.bpe() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => estimate_tokens_heuristic(text),
    }
}

/// Rough estimate: ~4 chars per token for words, ~2 for punctuation,
/// ~1.5 for CJK and ~2 for other non-ASCII text
pub fn estimate_tokens_heuristic(text: &str) -> usize {
    let (mut word, mut punct, mut cjk, mut other) = (0usize, 0usize, 0usize, 0usize);

    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || c == '_' {
            word += 1;
        } else if c.is_ascii() {
            punct += 1;
        } else if is_cjk(c) {
            cjk += 1;
        } else {
            other += 1;
        }
    }

    word.div_ceil(4) + punct.div_ceil(2) + (cjk * 2).div_ceil(3) + other.div_ceil(2)
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x3000..=0x30FF
        | 0xAC00..=0xD7AF
        | 0xFF00..=0xFFEF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens_empty() {
        assert_eq!(count_tokens("", TokenModel::Cl100k), 0);
        assert_eq!(count_tokens("", TokenModel::Heuristic), 0);
    }

    #[test]
    fn test_count_tokens_bpe() {
        let text = "def main():\n    print('hello')\n";
        let cl100k = count_tokens(text, TokenModel::Cl100k);
        let o200k = count_tokens(text, TokenModel::O200k);
        assert!(cl100k > 3 && cl100k < 30);
        assert!(o200k > 3 && o200k < 30);
    }

    #[test]
    fn test_heuristic_ascii() {
        // 30 word chars -> 8, 2 punctuation -> 1
        assert_eq!(estimate_tokens_heuristic("Hello world this is a test ok, ."), 9);
    }

    #[test]
    fn test_heuristic_cjk() {
        let tokens = estimate_tokens_heuristic("这是一个测试文档");
        assert_eq!(tokens, 6);
    }

    #[test]
    fn test_heuristic_close_to_bpe() {
        let text = "This is a longer piece of English text used for a sanity check.";
        let bpe = count_tokens(text, TokenModel::Cl100k) as f64;
        let estimate = estimate_tokens_heuristic(text) as f64;
        let ratio = estimate / bpe;
        assert!((0.5..=2.0).contains(&ratio), "ratio {}", ratio);
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!("cl100k".parse::<TokenModel>().unwrap(), TokenModel::Cl100k);
        assert_eq!("GPT-4o".parse::<TokenModel>().unwrap(), TokenModel::O200k);
        assert_eq!("fast".parse::<TokenModel>().unwrap(), TokenModel::Heuristic);
        let err = "bogus".parse::<TokenModel>().unwrap_err();
        assert!(err.contains("cl100k, o200k, heuristic"));
    }

    #[test]
    fn test_model_display_roundtrips() {
        for name in TokenModel::available_models() {
            let model: TokenModel = name.parse().unwrap();
            assert_eq!(model.to_string(), *name);
        }
    }
}
