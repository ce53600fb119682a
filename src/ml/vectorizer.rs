//! TF-IDF vectorizer for recording feature extraction.
//!
//! The vectorizer tokenizes every recording with a [`RegexTokenizer`],
//! builds a [`Vocabulary`] over the whole corpus and weighs each
//! (recording, pattern) pair:
//!
//! ```text
//! tf'  = 1 + ln(tf)                    (sublinear, tf > 0)
//! idf  = ln((1 + N) / (1 + df)) + 1    (smooth)
//! w    = tf' * idf, then each row scaled to unit L2 norm
//! ```

use std::collections::{BTreeSet, HashSet};

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::regex::{DEFAULT_TOKEN_PATTERN, RegexTokenizer};
use crate::error::{NawbaError, Result};

/// Row normalisation applied after weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TfidfNorm {
    /// Scale every row to unit Euclidean length.
    #[default]
    L2,
    /// Keep raw `tf * idf` weights.
    Disabled,
}

/// Configuration for [`TfIdfVectorizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Regex matched against recordings to extract pattern tokens.
    pub token_pattern: String,
    /// Lowercase tokens before building the vocabulary.
    pub lowercase: bool,
    /// Use `1 + ln(tf)` instead of raw term counts.
    pub sublinear_tf: bool,
    /// Add one to document frequencies as if an extra document held every term.
    pub smooth_idf: bool,
    /// Row normalisation.
    pub norm: TfidfNorm,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            lowercase: false,
            sublinear_tf: true,
            smooth_idf: true,
            norm: TfidfNorm::L2,
        }
    }
}

impl VectorizerConfig {
    /// Check that the token pattern compiles.
    pub fn validate(&self) -> Result<()> {
        RegexTokenizer::with_pattern(&self.token_pattern).map(|_| ())
    }
}

/// The distinct pattern tokens of a corpus, indexed in sorted order.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: AHashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from terms; duplicates collapse and indices follow
    /// lexicographic order.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sorted: BTreeSet<String> = terms.into_iter().map(Into::into).collect();
        let terms: Vec<String> = sorted.into_iter().collect();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();
        Vocabulary { terms, index }
    }

    /// Get the number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if the vocabulary holds no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Get the column index of a term.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Get the term at a column index.
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    /// Check if a term is in the vocabulary.
    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    /// Terms in index order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Iterate over terms in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

/// One sparse matrix row: column indices in ascending order with their weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseRow {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseRow {
    fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|(column, _)| *column);
        let (indices, values) = entries.into_iter().unzip();
        SparseRow { indices, values }
    }

    /// Weight at `column`, 0.0 when absent.
    pub fn get(&self, column: usize) -> f64 {
        self.indices
            .binary_search(&column)
            .map(|position| self.values[position])
            .unwrap_or(0.0)
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Iterate over (column, weight) pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Expand to a dense vector of `width` columns.
    pub fn to_dense(&self, width: usize) -> Vec<f64> {
        let mut dense = vec![0.0; width];
        for (column, value) in self.iter() {
            if column < width {
                dense[column] = value;
            }
        }
        dense
    }

    fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    fn scale(&mut self, factor: f64) {
        for value in &mut self.values {
            *value *= factor;
        }
    }
}

/// An N x |V| sparse matrix of TF-IDF weights, one row per recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfidfMatrix {
    rows: Vec<SparseRow>,
    n_columns: usize,
}

impl TfidfMatrix {
    /// Get the number of rows (recordings).
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (vocabulary size).
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Get a row by index.
    pub fn row(&self, row: usize) -> Option<&SparseRow> {
        self.rows.get(row)
    }

    /// Weight at (`row`, `column`), 0.0 when absent or out of range.
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.rows.get(row).map_or(0.0, |r| r.get(column))
    }

    /// Get a row as a dense vector.
    pub fn row_dense(&self, row: usize) -> Option<Vec<f64>> {
        self.rows.get(row).map(|r| r.to_dense(self.n_columns))
    }

    /// Total number of stored entries.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(SparseRow::nnz).sum()
    }

    /// Get all rows.
    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }
}

/// TF-IDF vectorizer over pattern tokens.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    tokenizer: RegexTokenizer,
    vocabulary: Vocabulary,
    /// Inverse document frequency per vocabulary index.
    idf: Vec<f64>,
    /// Total number of documents seen during fitting.
    n_documents: usize,
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: VectorizerConfig) -> Result<Self> {
        let tokenizer =
            RegexTokenizer::with_pattern(&config.token_pattern)?.lowercase(config.lowercase);
        Ok(Self {
            config,
            tokenizer,
            vocabulary: Vocabulary::default(),
            idf: Vec::new(),
            n_documents: 0,
        })
    }

    /// Fit the vocabulary and IDF weights on a corpus.
    pub fn fit<S: AsRef<str>>(&mut self, recordings: &[S]) -> Result<()> {
        let tokenized = self.tokenize_all(recordings)?;
        self.fit_tokens(&tokenized)
    }

    /// Weigh recordings against the fitted vocabulary. Tokens outside the
    /// vocabulary are ignored.
    pub fn transform<S: AsRef<str>>(&self, recordings: &[S]) -> Result<TfidfMatrix> {
        if self.vocabulary.is_empty() {
            return Err(NawbaError::empty_input("vectorizer has not been fitted"));
        }
        let tokenized = self.tokenize_all(recordings)?;
        Ok(self.weigh_all(&tokenized))
    }

    /// Fit on a corpus and weigh the same corpus.
    pub fn fit_transform<S: AsRef<str>>(&mut self, recordings: &[S]) -> Result<TfidfMatrix> {
        let tokenized = self.tokenize_all(recordings)?;
        self.fit_tokens(&tokenized)?;
        Ok(self.weigh_all(&tokenized))
    }

    /// Get the fitted vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Get the vocabulary size.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Get the IDF weights, indexed like the vocabulary.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Get the number of documents seen during fitting.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Get the configuration.
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    fn tokenize_all<S: AsRef<str>>(&self, recordings: &[S]) -> Result<Vec<Vec<String>>> {
        if recordings.is_empty() {
            return Err(NawbaError::empty_input("no recordings to vectorize"));
        }
        recordings
            .iter()
            .map(|recording| self.tokenizer.terms(recording.as_ref()))
            .collect()
    }

    fn fit_tokens(&mut self, tokenized: &[Vec<String>]) -> Result<()> {
        let mut document_frequency: AHashMap<&str, usize> = AHashMap::new();
        for terms in tokenized {
            let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let vocabulary = Vocabulary::from_terms(document_frequency.keys().copied());
        if vocabulary.is_empty() {
            return Err(NawbaError::empty_input(
                "empty vocabulary; recordings contain no pattern tokens",
            ));
        }

        let n = tokenized.len() as f64;
        let smooth = if self.config.smooth_idf { 1.0 } else { 0.0 };
        let idf = vocabulary
            .iter()
            .map(|term| {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
                ((n + smooth) / (df + smooth)).ln() + 1.0
            })
            .collect();

        debug!(
            "fitted tf-idf vocabulary: {} patterns over {} recordings",
            vocabulary.len(),
            tokenized.len()
        );

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = tokenized.len();
        Ok(())
    }

    fn weigh_all(&self, tokenized: &[Vec<String>]) -> TfidfMatrix {
        TfidfMatrix {
            rows: tokenized.iter().map(|terms| self.weigh(terms)).collect(),
            n_columns: self.vocabulary.len(),
        }
    }

    fn weigh(&self, terms: &[String]) -> SparseRow {
        let mut counts: AHashMap<usize, usize> = AHashMap::new();
        for term in terms {
            if let Some(index) = self.vocabulary.index_of(term) {
                *counts.entry(index).or_insert(0) += 1;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(index, count)| {
                let tf = if self.config.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                (index, tf * self.idf[index])
            })
            .collect();

        let mut row = SparseRow::from_entries(entries);
        if self.config.norm == TfidfNorm::L2 {
            let norm = row.norm();
            if norm > 0.0 {
                row.scale(1.0 / norm);
            }
        }
        row
    }
}
