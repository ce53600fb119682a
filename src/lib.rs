//! # Nawba
//!
//! Pattern statistics and classification for symbolic music recordings.
//!
//! ## Features
//!
//! - TF-IDF weighting of pattern tokens with sklearn-compatible defaults
//! - Per-recording pattern distributions (score and raw count)
//! - Grouping and pivoting of pattern frames per recording or category
//! - One-vs-rest logistic regression with held-out accuracy
//! - Optional rayon-parallel distribution extraction

pub mod analysis;
pub mod config;
pub mod error;
pub mod ml;
pub mod pipeline;
pub mod table;

pub mod prelude {
    pub use crate::analysis::{SplitRule, Tokenizer};
    pub use crate::config::PipelineConfig;
    pub use crate::error::{NawbaError, Result};
    pub use crate::ml::{
        AggregatedFrame, ClassifierConfig, Distribution, Evaluation, MissingValuePolicy,
        PatternWeight, TfIdfVectorizer, VectorizerConfig,
    };
    pub use crate::pipeline::{NawbaPipeline, PipelineReport};
    pub use crate::table::{Frame, Key};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
