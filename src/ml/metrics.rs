//! Classification metrics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{NawbaError, Result};

fn check_lengths<L>(truth: &[L], predicted: &[L]) -> Result<()> {
    if truth.len() != predicted.len() {
        return Err(NawbaError::invalid_argument(format!(
            "{} true labels but {} predictions",
            truth.len(),
            predicted.len()
        )));
    }
    if truth.is_empty() {
        return Err(NawbaError::empty_input("no labels to score"));
    }
    Ok(())
}

/// Fraction of predictions equal to the true label.
pub fn accuracy_score<L: PartialEq>(truth: &[L], predicted: &[L]) -> Result<f64> {
    check_lengths(truth, predicted)?;
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

/// Counts of (true label, predicted label) pairs.
///
/// Rows are true labels and columns are predicted labels, both in sorted
/// label order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix<L> {
    labels: Vec<L>,
    counts: Vec<Vec<usize>>,
}

impl<L: Ord + Clone> ConfusionMatrix<L> {
    /// Tally predictions against the truth. Both slices must be non-empty and
    /// of equal length.
    pub fn from_predictions(truth: &[L], predicted: &[L]) -> Result<Self> {
        check_lengths(truth, predicted)?;

        let positions: BTreeMap<&L, usize> = truth
            .iter()
            .chain(predicted)
            .map(|label| (label, 0))
            .collect::<BTreeMap<_, _>>()
            .into_keys()
            .enumerate()
            .map(|(position, label)| (label, position))
            .collect();

        let mut counts = vec![vec![0; positions.len()]; positions.len()];
        for (t, p) in truth.iter().zip(predicted) {
            counts[positions[t]][positions[p]] += 1;
        }

        Ok(ConfusionMatrix {
            labels: positions.into_keys().cloned().collect(),
            counts,
        })
    }

    /// Get the labels, sorted. Rows and columns follow this order.
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// Number of samples with true label `truth` predicted as `predicted`.
    pub fn get(&self, truth: &L, predicted: &L) -> usize {
        let t = self.labels.binary_search(truth);
        let p = self.labels.binary_search(predicted);
        match (t, p) {
            (Ok(t), Ok(p)) => self.counts[t][p],
            _ => 0,
        }
    }

    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Get the number of tallied predictions.
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Sum of the diagonal.
    pub fn correct(&self) -> usize {
        (0..self.labels.len()).map(|i| self.counts[i][i]).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        let accuracy = accuracy_score(&[1, 2, 3, 1], &[1, 2, 1, 1]).unwrap();
        assert!((accuracy - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_errors() {
        assert!(matches!(
            accuracy_score(&[1, 2], &[1]),
            Err(NawbaError::InvalidArgument(_))
        ));
        let empty: [u8; 0] = [];
        assert!(matches!(
            accuracy_score(&empty, &empty),
            Err(NawbaError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_confusion_matrix() {
        let truth = ["a", "a", "b", "c"];
        let predicted = ["a", "b", "b", "a"];
        let matrix = ConfusionMatrix::from_predictions(&truth, &predicted).unwrap();

        assert_eq!(matrix.labels(), &["a", "b", "c"]);
        assert_eq!(matrix.get(&"a", &"a"), 1);
        assert_eq!(matrix.get(&"a", &"b"), 1);
        assert_eq!(matrix.get(&"c", &"a"), 1);
        assert_eq!(matrix.get(&"z", &"a"), 0);
        assert_eq!(matrix.total(), 4);
        assert_eq!(matrix.correct(), 2);
    }
}
