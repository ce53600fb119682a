//! Tokenizer implementations for recordings.
//!
//! Two splitting rules are kept apart on purpose:
//!
//! - [`regex::RegexTokenizer`] - extracts tokens matching a character-class
//!   pattern; this is what the TF-IDF vectorizer sees.
//! - [`whitespace::WhitespaceTokenizer`] - splits on whitespace; this is what
//!   local term counting sees.
//!
//! The two rules agree whenever a recording consists only of pattern
//! characters separated by whitespace. They disagree on tokens carrying
//! other characters (`"a.b"` is one whitespace token but two regex tokens).
//!
//! # Examples
//!
//! ```
//! use nawba::analysis::tokenizer::Tokenizer;
//! use nawba::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//!
//! let tokenizer = WhitespaceTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("A4-q B4-e").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert a recording into tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Tokenize and collect only the token texts.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.tokenize(text)?.map(|token| token.text).collect())
    }
}

pub mod regex;
pub mod whitespace;

pub use regex::RegexTokenizer;
pub use whitespace::{SplitRule, WhitespaceTokenizer};
