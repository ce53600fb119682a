//! Whitespace tokenizer implementation.

use serde::{Deserialize, Serialize};

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// How a recording is split into local tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitRule {
    /// Split on any run of Unicode whitespace; no empty tokens.
    #[default]
    Whitespace,
    /// Split on every single U+0020 space. Consecutive, leading or trailing
    /// spaces produce empty tokens, which are counted like any other token.
    SingleSpace,
}

/// A tokenizer that splits text on whitespace.
#[derive(Clone, Debug, Default)]
pub struct WhitespaceTokenizer {
    rule: SplitRule,
}

impl WhitespaceTokenizer {
    /// Create a new whitespace tokenizer.
    pub fn new() -> Self {
        WhitespaceTokenizer {
            rule: SplitRule::Whitespace,
        }
    }

    /// Create a tokenizer with an explicit split rule.
    pub fn with_rule(rule: SplitRule) -> Self {
        WhitespaceTokenizer { rule }
    }

    /// The split rule in use.
    pub fn rule(&self) -> SplitRule {
        self.rule
    }

    fn split_whitespace(text: &str) -> Vec<Token> {
        let base = text.as_ptr() as usize;
        text.split_whitespace()
            .enumerate()
            .map(|(position, word)| {
                let start_offset = word.as_ptr() as usize - base;
                Token::with_offsets(word, position, start_offset, start_offset + word.len())
            })
            .collect()
    }

    fn split_single_space(text: &str) -> Vec<Token> {
        let mut offset = 0;
        text.split(' ')
            .enumerate()
            .map(|(position, word)| {
                let token = Token::with_offsets(word, position, offset, offset + word.len());
                offset += word.len() + 1;
                token
            })
            .collect()
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens = match self.rule {
            SplitRule::Whitespace => Self::split_whitespace(text),
            SplitRule::SingleSpace => Self::split_single_space(text),
        };

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        match self.rule {
            SplitRule::Whitespace => "whitespace",
            SplitRule::SingleSpace => "single_space",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokenizer() {
        let tokenizer = WhitespaceTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("a  b\tc").unwrap().collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "a");
        assert_eq!(tokens[1].text, "b");
        assert_eq!(tokens[1].start_offset, 3);
        assert_eq!(tokens[2].text, "c");
        assert_eq!(tokens[2].end_offset, 6);
    }

    #[test]
    fn test_single_space_keeps_empty_tokens() {
        let tokenizer = WhitespaceTokenizer::with_rule(SplitRule::SingleSpace);
        let terms = tokenizer.terms("a  b").unwrap();
        assert_eq!(terms, vec!["a", "", "b"]);

        let tokens: Vec<Token> = tokenizer.tokenize("a  b").unwrap().collect();
        assert_eq!(tokens[2].start_offset, 3);
    }

    #[test]
    fn test_empty_text() {
        assert!(WhitespaceTokenizer::new().terms("   ").unwrap().is_empty());
        assert_eq!(
            WhitespaceTokenizer::with_rule(SplitRule::SingleSpace)
                .terms("")
                .unwrap(),
            vec![""]
        );
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(WhitespaceTokenizer::new().name(), "whitespace");
        assert_eq!(
            WhitespaceTokenizer::with_rule(SplitRule::SingleSpace).name(),
            "single_space"
        );
    }
}
