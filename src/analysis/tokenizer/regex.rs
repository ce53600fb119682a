//! Regex-based tokenizer implementation.

use std::sync::Arc;

use regex::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{NawbaError, Result};

/// Default pattern for pattern tokens: ASCII letters, digits, `#` and `-`.
pub const DEFAULT_TOKEN_PATTERN: &str = r"[A-Za-z0-9#-]+";

/// A regex-based tokenizer that extracts tokens using a regular expression.
///
/// Matching is case-sensitive. Empty matches are never emitted, so a pattern
/// that can match the empty string behaves like its non-empty counterpart.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    /// The regex pattern used to extract tokens
    pattern: Arc<Regex>,
    /// Whether token text is lowercased before emission
    lowercase: bool,
}

impl RegexTokenizer {
    /// Create a new regex tokenizer with [`DEFAULT_TOKEN_PATTERN`].
    pub fn new() -> Result<Self> {
        Self::with_pattern(DEFAULT_TOKEN_PATTERN)
    }

    /// Create a new regex tokenizer with a custom pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| NawbaError::analysis(format!("Invalid regex pattern: {e}")))?;

        Ok(RegexTokenizer {
            pattern: Arc::new(regex),
            lowercase: false,
        })
    }

    /// Lowercase every emitted token.
    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Get the regex pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Check if this tokenizer lowercases its output.
    pub fn is_lowercase(&self) -> bool {
        self.lowercase
    }
}

impl Default for RegexTokenizer {
    fn default() -> Self {
        Self::new().expect("Default regex pattern should be valid")
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let lowercase = self.lowercase;
        let tokens: Vec<Token> = self
            .pattern
            .find_iter(text)
            .filter(|mat| !mat.as_str().is_empty())
            .enumerate()
            .map(|(position, mat)| {
                let term = if lowercase {
                    mat.as_str().to_lowercase()
                } else {
                    mat.as_str().to_string()
                };
                Token::with_offsets(term, position, mat.start(), mat.end())
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_tokenizer() {
        let tokenizer = RegexTokenizer::new().unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("C#4-q  Eb4-e").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "C#4-q");
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 5);
        assert_eq!(tokens[1].text, "Eb4-e");
        assert_eq!(tokens[1].position, 1);
    }

    #[test]
    fn test_case_sensitive_by_default() {
        let tokenizer = RegexTokenizer::new().unwrap();
        let terms = tokenizer.terms("Ab ab AB").unwrap();
        assert_eq!(terms, vec!["Ab", "ab", "AB"]);

        let lowered = RegexTokenizer::new().unwrap().lowercase(true);
        assert_eq!(lowered.terms("Ab AB").unwrap(), vec!["ab", "ab"]);
    }

    #[test]
    fn test_characters_outside_class_split_tokens() {
        let tokenizer = RegexTokenizer::new().unwrap();
        let terms = tokenizer.terms("a.b c_d").unwrap();
        assert_eq!(terms, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_empty_matches_are_skipped() {
        let tokenizer = RegexTokenizer::with_pattern(r"[a-z]*").unwrap();
        let terms = tokenizer.terms("ab  cd").unwrap();
        assert_eq!(terms, vec!["ab", "cd"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = RegexTokenizer::with_pattern("[a-").unwrap_err();
        assert!(matches!(err, NawbaError::Analysis(_)));
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(RegexTokenizer::default().name(), "regex");
    }
}
