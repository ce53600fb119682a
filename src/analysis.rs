//! Recording analysis: turning a recording string into pattern tokens.

pub mod token;
pub mod tokenizer;

pub use token::{Token, TokenStream};
pub use tokenizer::{RegexTokenizer, SplitRule, Tokenizer, WhitespaceTokenizer};
