//! End-to-end nawba pipeline.
//!
//! [`NawbaPipeline`] wires the stages together under one [`PipelineConfig`]:
//! recordings are vectorized, turned into per-recording distributions,
//! aggregated per index and finally fed to the classifier.
//!
//! ```
//! use nawba::config::PipelineConfig;
//! use nawba::pipeline::NawbaPipeline;
//!
//! let pipeline = NawbaPipeline::new(PipelineConfig::default()).unwrap();
//! let distributions = pipeline.distributions(&["a b a", "b b c"]).unwrap();
//! assert_eq!(distributions[0].counts(), vec![2, 1, 0]);
//!
//! let aggregated = pipeline.aggregate(&distributions, &["east", "east"]).unwrap();
//! assert_eq!(aggregated.get(&"east", "b").unwrap().count, 3);
//! ```

use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::ml::aggregate::{
    AggregatedFrame, AnnotatedRecordingRow, AnnotatedRow, average_by_category, category_frame,
    category_recordings_frame, zip_to_frame,
};
use crate::ml::classifier::{Evaluation, NawbaClassifier};
use crate::ml::distribution::{Distribution, DistributionExtractor};
use crate::ml::vectorizer::{TfIdfVectorizer, TfidfMatrix, Vocabulary};
use crate::table::{Frame, Key};

/// Vocabulary and TF-IDF weights of a corpus.
#[derive(Debug, Clone)]
pub struct Vectorized {
    /// Distinct pattern tokens of the corpus, sorted.
    pub vocabulary: Vocabulary,
    /// One row per recording, one column per vocabulary pattern.
    pub matrix: TfidfMatrix,
}

/// Everything produced by [`NawbaPipeline::run`].
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport<K, L> {
    /// Per-recording distributions, in recording order.
    pub distributions: Vec<Distribution>,
    /// Mean score and summed count per (index, pattern).
    pub aggregated: AggregatedFrame<K>,
    /// Held-out accuracy and confusion matrix.
    pub evaluation: Evaluation<L>,
}

/// Runs the nawba stages under a single validated [`PipelineConfig`].
///
/// Every call starts from its inputs; nothing fitted is kept between calls.
#[derive(Debug, Clone)]
pub struct NawbaPipeline {
    config: PipelineConfig,
}

impl NawbaPipeline {
    /// Create a pipeline, rejecting an invalid configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(NawbaPipeline { config })
    }

    /// Get the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fit a fresh vectorizer on `recordings` and weigh them.
    pub fn vectorize<S: AsRef<str>>(&self, recordings: &[S]) -> Result<Vectorized> {
        let mut vectorizer = TfIdfVectorizer::new(self.config.vectorizer.clone())?;
        let matrix = vectorizer.fit_transform(recordings)?;
        Ok(Vectorized {
            vocabulary: vectorizer.vocabulary().clone(),
            matrix,
        })
    }

    /// One distribution per recording, aligned to the corpus vocabulary.
    pub fn distributions<S>(&self, recordings: &[S]) -> Result<Vec<Distribution>>
    where
        S: AsRef<str> + Sync,
    {
        let Vectorized { vocabulary, matrix } = self.vectorize(recordings)?;
        self.extractor().extract(&matrix, &vocabulary, recordings)
    }

    /// Tag distributions with `indices` and average them per (index, pattern).
    pub fn aggregate<K: Key>(
        &self,
        distributions: &[Distribution],
        indices: &[K],
    ) -> Result<AggregatedFrame<K>> {
        let long = zip_to_frame(distributions, indices)?;
        let aggregated = average_by_category(&long);
        debug!(
            "aggregated {} long rows into {} (index, pattern) rows",
            long.len(),
            aggregated.len()
        );
        Ok(aggregated)
    }

    /// Pattern scores of the last recording tagged with `category`.
    pub fn category_frame<C: Key>(
        &self,
        distributions: &[Distribution],
        category: &C,
        recording_categories: &[C],
        defining_patterns: &HashMap<C, Vec<String>>,
    ) -> Result<Frame<AnnotatedRow>> {
        category_frame(distributions, category, recording_categories, defining_patterns)
    }

    /// Pattern scores of every recording tagged with `category`.
    pub fn category_recordings_frame<C: Key>(
        &self,
        distributions: &[Distribution],
        category: &C,
        recording_categories: &[C],
        defining_patterns: &HashMap<C, Vec<String>>,
    ) -> Result<Frame<AnnotatedRecordingRow>> {
        category_recordings_frame(distributions, category, recording_categories, defining_patterns)
    }

    /// Train on the aggregated frame and score the held-out rows.
    pub fn evaluate<K: Key, C: Key, L: Key>(
        &self,
        aggregated: &AggregatedFrame<K>,
        defining_patterns: &HashMap<C, Vec<String>>,
        class_of: &HashMap<K, L>,
    ) -> Result<Evaluation<L>> {
        NawbaClassifier::new(self.config.classifier.clone()).evaluate(
            aggregated,
            defining_patterns,
            class_of,
        )
    }

    /// Run every stage: vectorize, extract, aggregate by `indices`, evaluate.
    pub fn run<S, K, C, L>(
        &self,
        recordings: &[S],
        indices: &[K],
        defining_patterns: &HashMap<C, Vec<String>>,
        class_of: &HashMap<K, L>,
    ) -> Result<PipelineReport<K, L>>
    where
        S: AsRef<str> + Sync,
        K: Key,
        C: Key,
        L: Key,
    {
        let distributions = self.distributions(recordings)?;
        let aggregated = self.aggregate(&distributions, indices)?;
        let evaluation = self.evaluate(&aggregated, defining_patterns, class_of)?;
        Ok(PipelineReport {
            distributions,
            aggregated,
            evaluation,
        })
    }

    fn extractor(&self) -> DistributionExtractor {
        DistributionExtractor::new(self.config.local_split).parallel(self.config.parallel)
    }
}
