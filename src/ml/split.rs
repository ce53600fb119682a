//! Random train/test partitioning of table rows.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{NawbaError, Result};

/// Row positions assigned to each side of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `n_rows` positions and cut them into test and train parts.
///
/// The test side holds `ceil(test_size * n_rows)` rows. With `seed == None`
/// the permutation is drawn from OS entropy and differs between runs.
pub fn train_test_split(n_rows: usize, test_size: f64, seed: Option<u64>) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(NawbaError::invalid_argument(format!(
            "test_size must lie in (0, 1), got {test_size}"
        )));
    }

    let n_test = (test_size * n_rows as f64).ceil() as usize;
    let n_train = n_rows.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(NawbaError::invalid_argument(format!(
            "{n_rows} rows cannot be split into non-empty train and test sets (test_size {test_size})"
        )));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut permutation: Vec<usize> = (0..n_rows).collect();
    permutation.shuffle(&mut rng);

    let train = permutation.split_off(n_test);
    Ok(TrainTestSplit {
        train,
        test: permutation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(10, 0.6, Some(7)).unwrap();
        assert_eq!(split.test.len(), 6);
        assert_eq!(split.train.len(), 4);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_test_side_rounds_up() {
        let split = train_test_split(3, 0.6, Some(1)).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 1);
    }

    #[test]
    fn test_seeded_split_is_reproducible() {
        let a = train_test_split(20, 0.6, Some(42)).unwrap();
        let b = train_test_split(20, 0.6, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unseeded_split_is_valid() {
        let split = train_test_split(5, 0.6, None).unwrap();
        assert_eq!(split.test.len() + split.train.len(), 5);
    }

    #[test]
    fn test_degenerate_splits() {
        assert!(train_test_split(1, 0.6, Some(0)).is_err());
        assert!(train_test_split(0, 0.6, Some(0)).is_err());
        assert!(train_test_split(10, 1.0, Some(0)).is_err());
        assert!(train_test_split(10, 0.0, Some(0)).is_err());
    }
}
