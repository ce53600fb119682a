//! Token types produced by the tokenizers.
//!
//! A [`Token`] is one pattern occurrence inside a recording, together with
//! its position in the token stream and its byte offsets in the source text.
//!
//! # Examples
//!
//! ```
//! use nawba::analysis::token::Token;
//!
//! let token = Token::with_offsets("D#4-q", 1, 6, 11);
//! assert_eq!(token.text, "D#4-q");
//! assert_eq!(token.start_offset, 6);
//! assert_eq!(token.end_offset, 11);
//! ```

use serde::{Deserialize, Serialize};

/// A single pattern occurrence extracted from a recording.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,
}

impl Token {
    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
        }
    }
}

/// A boxed iterator of tokens.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;
