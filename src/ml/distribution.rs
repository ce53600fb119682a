//! Per-recording pattern distributions.
//!
//! A [`Distribution`] pairs every vocabulary pattern with a weighted score
//! and its literal occurrence count in one recording. The local term
//! frequency used for the score is normalised by the number of *distinct*
//! local tokens, not by the recording length:
//!
//! ```text
//! local_tf(v) = count(v) / |distinct tokens of the recording|
//! score(v)    = local_tf(v) * tfidf(recording, v)
//! ```
//!
//! Local tokens come from a [`WhitespaceTokenizer`], independently of the
//! regex rule the vectorizer applies.

use std::cmp::Ordering;

use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::whitespace::{SplitRule, WhitespaceTokenizer};
use crate::error::{NawbaError, Result};
use crate::ml::vectorizer::{SparseRow, TfidfMatrix, Vocabulary};

/// One vocabulary pattern inside a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternWeight {
    /// The vocabulary pattern.
    pub pattern: String,
    /// Local term frequency times the corpus TF-IDF weight.
    pub score: f64,
    /// Literal occurrence count in the recording.
    pub count: usize,
}

/// Vocabulary-aligned pattern weights of one recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distribution {
    entries: Vec<PatternWeight>,
}

impl Distribution {
    /// Create a distribution from entries already in vocabulary order.
    pub fn from_entries(entries: Vec<PatternWeight>) -> Self {
        Distribution { entries }
    }

    /// Get the number of patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the distribution holds no patterns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the entries in vocabulary order.
    pub fn entries(&self) -> &[PatternWeight] {
        &self.entries
    }

    /// Iterate over the entries in vocabulary order.
    pub fn iter(&self) -> std::slice::Iter<'_, PatternWeight> {
        self.entries.iter()
    }

    /// Get the entry of a pattern.
    pub fn get(&self, pattern: &str) -> Option<&PatternWeight> {
        self.entries.iter().find(|entry| entry.pattern == pattern)
    }

    /// Occurrence counts in vocabulary order.
    pub fn counts(&self) -> Vec<usize> {
        self.entries.iter().map(|entry| entry.count).collect()
    }

    /// Scores in vocabulary order.
    pub fn scores(&self) -> Vec<f64> {
        self.entries.iter().map(|entry| entry.score).collect()
    }

    /// The `n` highest scoring patterns, best first. `n == 0` returns every
    /// pattern. Equal scores keep vocabulary order.
    pub fn top_n(&self, n: usize) -> Vec<&PatternWeight> {
        let mut ranked: Vec<&PatternWeight> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        if n > 0 {
            ranked.truncate(n);
        }
        ranked
    }
}

impl<'a> IntoIterator for &'a Distribution {
    type Item = &'a PatternWeight;
    type IntoIter = std::slice::Iter<'a, PatternWeight>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds [`Distribution`]s from a TF-IDF matrix and the raw recordings.
#[derive(Debug, Clone, Default)]
pub struct DistributionExtractor {
    tokenizer: WhitespaceTokenizer,
    parallel: bool,
}

impl DistributionExtractor {
    /// Create a sequential extractor counting with `rule`.
    pub fn new(rule: SplitRule) -> Self {
        Self {
            tokenizer: WhitespaceTokenizer::with_rule(rule),
            parallel: false,
        }
    }

    /// Extract recordings on the rayon pool. Output order is unchanged.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// One distribution per recording, in recording order.
    pub fn extract<S>(
        &self,
        matrix: &TfidfMatrix,
        vocabulary: &Vocabulary,
        recordings: &[S],
    ) -> Result<Vec<Distribution>>
    where
        S: AsRef<str> + Sync,
    {
        if matrix.n_rows() != recordings.len() {
            return Err(NawbaError::invalid_argument(format!(
                "tf-idf matrix has {} rows but {} recordings were given",
                matrix.n_rows(),
                recordings.len()
            )));
        }
        if matrix.n_columns() != vocabulary.len() {
            return Err(NawbaError::invalid_argument(format!(
                "tf-idf matrix has {} columns but the vocabulary holds {} patterns",
                matrix.n_columns(),
                vocabulary.len()
            )));
        }

        let extract_one = |(position, recording): (usize, &S)| {
            let weights = matrix.rows().get(position).ok_or_else(|| {
                NawbaError::invalid_argument(format!("no tf-idf row for recording {position}"))
            })?;
            self.extract_recording(position, recording.as_ref(), weights, vocabulary)
        };

        if self.parallel {
            recordings.par_iter().enumerate().map(extract_one).collect()
        } else {
            recordings.iter().enumerate().map(extract_one).collect()
        }
    }

    fn extract_recording(
        &self,
        position: usize,
        recording: &str,
        weights: &SparseRow,
        vocabulary: &Vocabulary,
    ) -> Result<Distribution> {
        let terms = self.tokenizer.terms(recording)?;
        let mut counts: AHashMap<&str, usize> = AHashMap::new();
        for term in &terms {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }

        let distinct = counts.len();
        if distinct == 0 {
            return Err(NawbaError::division_by_zero(format!(
                "recording {position} has no distinct local tokens"
            )));
        }

        let entries = vocabulary
            .iter()
            .enumerate()
            .map(|(column, pattern)| {
                let count = counts.get(pattern).copied().unwrap_or(0);
                let local_tf = count as f64 / distinct as f64;
                PatternWeight {
                    pattern: pattern.to_string(),
                    score: local_tf * weights.get(column),
                    count,
                }
            })
            .collect();

        Ok(Distribution::from_entries(entries))
    }
}
