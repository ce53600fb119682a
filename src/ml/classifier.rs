//! Training and evaluating the nawba classifier.
//!
//! The aggregated (index, pattern) table is restricted to the union of every
//! category's defining patterns and pivoted into a wide [`FeatureTable`]
//! (one row per index, one column per pattern, cell = summed count). Rows
//! are split into train and test sides, a one-vs-rest logistic regression is
//! fitted on the train side and scored on the test side.

use std::collections::{HashMap, HashSet};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{NawbaError, Result};
use crate::ml::aggregate::AggregatedFrame;
use crate::ml::logistic::{LogisticConfig, LogisticRegression};
use crate::ml::metrics::{ConfusionMatrix, accuracy_score};
use crate::ml::split::{TrainTestSplit, train_test_split};
use crate::table::{Key, PivotAggregation};

/// What to do with (index, pattern) cells that have no aggregated row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Treat missing cells as a count of zero and keep every column.
    #[default]
    FillZero,
    /// Keep only columns without missing cells on both the train and the
    /// test side.
    IntersectColumns,
}

/// Configuration for [`NawbaClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Fraction of rows held out for testing.
    pub test_size: f64,
    /// Seed for the train/test shuffle. `None` draws a fresh permutation on
    /// every run.
    pub split_seed: Option<u64>,
    /// How feature cells absent from the aggregated frame are handled.
    pub missing_values: MissingValuePolicy,
    /// Solver settings.
    pub logistic: LogisticConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            test_size: 0.6,
            split_seed: None,
            missing_values: MissingValuePolicy::FillZero,
            logistic: LogisticConfig::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(NawbaError::invalid_config(format!(
                "test_size must lie in (0, 1), got {}",
                self.test_size
            )));
        }
        self.logistic.validate()
    }
}

/// Wide table of pattern counts: one labelled row per index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureTable<L> {
    labels: Vec<L>,
    columns: Vec<String>,
    cells: Vec<Vec<Option<f64>>>,
}

impl<L: Key> FeatureTable<L> {
    /// Pivot `frame` into a feature table.
    ///
    /// Only patterns listed in some category of `defining_patterns` become
    /// columns. Each row index is replaced by its class from `class_of`.
    pub fn build<K: Key, C: Key>(
        frame: &AggregatedFrame<K>,
        defining_patterns: &HashMap<C, Vec<String>>,
        class_of: &HashMap<K, L>,
    ) -> Result<Self> {
        let patterns: HashSet<&str> = defining_patterns
            .values()
            .flatten()
            .map(String::as_str)
            .collect();

        let selected = frame
            .frame()
            .filter(|row| patterns.contains(row.pattern.as_str()));
        if selected.is_empty() {
            return Err(NawbaError::empty_input(
                "no aggregated pattern belongs to any category's defining patterns",
            ));
        }

        let (index, columns, cells) = selected
            .pivot(
                |row| row.index.clone(),
                |row| row.pattern.clone(),
                |row| row.count as f64,
                PivotAggregation::Mean,
            )
            .into_parts();

        let labels = index
            .iter()
            .map(|key| {
                class_of
                    .get(key)
                    .cloned()
                    .ok_or_else(|| NawbaError::unmapped_key(format!("no class for index {key:?}")))
            })
            .collect::<Result<Vec<L>>>()?;

        Ok(FeatureTable {
            labels,
            columns,
            cells,
        })
    }

    /// Assemble a table from parts. Every row must have one cell per column.
    pub fn from_parts(
        labels: Vec<L>,
        columns: Vec<String>,
        cells: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if labels.len() != cells.len() {
            return Err(NawbaError::invalid_argument(format!(
                "{} labels but {} rows",
                labels.len(),
                cells.len()
            )));
        }
        if let Some(row) = cells.iter().position(|row| row.len() != columns.len()) {
            return Err(NawbaError::column_mismatch(format!(
                "row {row} has {} cells, expected {}",
                cells[row].len(),
                columns.len()
            )));
        }
        Ok(FeatureTable {
            labels,
            columns,
            cells,
        })
    }

    /// Get the class label of each row.
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// Get the feature column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the number of rows.
    pub fn n_rows(&self) -> usize {
        self.cells.len()
    }

    /// Get the number of feature columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Get a cell, `None` when missing or out of range.
    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        self.cells.get(row)?.get(column).copied().flatten()
    }

    /// Count the missing cells.
    pub fn missing_count(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_none()).count()
    }

    /// Columns without a missing cell among `rows`.
    fn complete_columns(&self, rows: &[usize]) -> Vec<usize> {
        (0..self.n_columns())
            .filter(|&column| rows.iter().all(|&row| self.cells[row][column].is_some()))
            .collect()
    }

    /// Dense feature rows; missing cells read as 0.0.
    fn dense(&self, rows: &[usize], columns: &[usize]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|&row| {
                columns
                    .iter()
                    .map(|&column| self.cells[row][column].unwrap_or(0.0))
                    .collect()
            })
            .collect()
    }

    fn labels_of(&self, rows: &[usize]) -> Vec<L> {
        rows.iter().map(|&row| self.labels[row].clone()).collect()
    }
}

/// Outcome of one train/evaluate run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation<L> {
    /// Fraction of test rows predicted correctly, in [0, 1].
    pub accuracy: f64,
    /// Rows on the train side.
    pub n_train: usize,
    /// Rows on the test side.
    pub n_test: usize,
    /// Pattern columns the model was fitted on.
    pub features: Vec<String>,
    pub confusion: ConfusionMatrix<L>,
}

/// Fits and scores a logistic classifier on a [`FeatureTable`].
#[derive(Debug, Clone, Default)]
pub struct NawbaClassifier {
    config: ClassifierConfig,
}

impl NawbaClassifier {
    /// Create a classifier with the given configuration.
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Build the feature table from `frame` and evaluate on it.
    pub fn evaluate<K: Key, C: Key, L: Key>(
        &self,
        frame: &AggregatedFrame<K>,
        defining_patterns: &HashMap<C, Vec<String>>,
        class_of: &HashMap<K, L>,
    ) -> Result<Evaluation<L>> {
        let table = FeatureTable::build(frame, defining_patterns, class_of)?;
        self.evaluate_table(&table)
    }

    /// Split `table`, fit on the train side, score on the test side.
    pub fn evaluate_table<L: Key>(&self, table: &FeatureTable<L>) -> Result<Evaluation<L>> {
        self.config.validate()?;

        let split = train_test_split(table.n_rows(), self.config.test_size, self.config.split_seed)?;
        info!(
            "training on {} rows, testing on {} rows",
            split.train.len(),
            split.test.len()
        );

        let columns = self.select_columns(table, &split)?;
        let x_train = table.dense(&split.train, &columns);
        let y_train = table.labels_of(&split.train);
        let model = LogisticRegression::new(self.config.logistic.clone()).fit(&x_train, &y_train)?;

        let x_test = table.dense(&split.test, &columns);
        let y_test = table.labels_of(&split.test);
        let predicted = model.predict(&x_test)?;

        let accuracy = accuracy_score(&y_test, &predicted)?;
        let confusion = ConfusionMatrix::from_predictions(&y_test, &predicted)?;
        info!("held-out accuracy {accuracy:.4} over {} patterns", columns.len());

        Ok(Evaluation {
            accuracy,
            n_train: split.train.len(),
            n_test: split.test.len(),
            features: columns.iter().map(|&c| table.columns[c].clone()).collect(),
            confusion,
        })
    }

    fn select_columns<L: Key>(
        &self,
        table: &FeatureTable<L>,
        split: &TrainTestSplit,
    ) -> Result<Vec<usize>> {
        match self.config.missing_values {
            MissingValuePolicy::FillZero => Ok((0..table.n_columns()).collect()),
            MissingValuePolicy::IntersectColumns => {
                let train = table.complete_columns(&split.train);
                let test: HashSet<usize> = table.complete_columns(&split.test).into_iter().collect();
                let kept: Vec<usize> = train.into_iter().filter(|c| test.contains(c)).collect();

                if kept.is_empty() {
                    return Err(NawbaError::column_mismatch(
                        "train and test sides share no complete pattern column",
                    ));
                }
                if kept.len() < table.n_columns() {
                    warn!(
                        "dropped {} of {} pattern columns with missing values",
                        table.n_columns() - kept.len(),
                        table.n_columns()
                    );
                }
                Ok(kept)
            }
        }
    }
}

/// Held-out accuracy of a classifier trained on `frame`.
pub fn train_classifier<K: Key, C: Key, L: Key>(
    frame: &AggregatedFrame<K>,
    defining_patterns: &HashMap<C, Vec<String>>,
    class_of: &HashMap<K, L>,
    config: &ClassifierConfig,
) -> Result<f64> {
    NawbaClassifier::new(config.clone())
        .evaluate(frame, defining_patterns, class_of)
        .map(|evaluation| evaluation.accuracy)
}
