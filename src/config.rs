//! Pipeline configuration.
//!
//! Every field has a default, so a JSON document only needs the keys it
//! changes:
//!
//! ```
//! use nawba::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_json_str(r#"{ "classifier": { "split_seed": 7 } }"#).unwrap();
//! assert_eq!(config.classifier.split_seed, Some(7));
//! assert_eq!(config.classifier.test_size, 0.6);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::SplitRule;
use crate::error::Result;
use crate::ml::classifier::ClassifierConfig;
use crate::ml::vectorizer::VectorizerConfig;

/// Configuration of a full [`NawbaPipeline`](crate::pipeline::NawbaPipeline) run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Corpus TF-IDF settings.
    pub vectorizer: VectorizerConfig,
    /// How recordings are split for local term counting.
    pub local_split: SplitRule,
    /// Split and solver settings.
    pub classifier: ClassifierConfig,
    /// Extract distributions on the rayon thread pool.
    pub parallel: bool,
}

impl PipelineConfig {
    /// Parse and validate a configuration from JSON. Missing fields take
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every nested configuration.
    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.classifier.validate()
    }
}
