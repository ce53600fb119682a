//! Reshaping per-recording distributions into per-category frames.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{NawbaError, Result};
use crate::ml::distribution::Distribution;
use crate::table::{Frame, Key};

/// One (index, pattern) observation.
///
/// In a long frame there is one row per (recording, pattern). In an
/// [`AggregatedFrame`] there is one row per (index, pattern), with `score`
/// holding the mean and `count` the sum over the index's recordings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRow<K> {
    pub index: K,
    pub pattern: String,
    pub score: f64,
    pub count: usize,
}

/// Long-format table of pattern observations.
pub type LongFrame<K> = Frame<FrameRow<K>>;

/// Flatten distributions into a long frame, tagging each recording's rows
/// with its index. `indices` runs parallel to `distributions`.
pub fn zip_to_frame<K: Clone>(distributions: &[Distribution], indices: &[K]) -> Result<LongFrame<K>> {
    if distributions.len() != indices.len() {
        return Err(NawbaError::invalid_argument(format!(
            "{} distributions but {} indices",
            distributions.len(),
            indices.len()
        )));
    }

    Ok(distributions
        .iter()
        .zip(indices)
        .flat_map(|(distribution, index)| {
            distribution.iter().map(move |weight| FrameRow {
                index: index.clone(),
                pattern: weight.pattern.clone(),
                score: weight.score,
                count: weight.count,
            })
        })
        .collect())
}

/// Group a long frame by (index, pattern): mean score, summed count.
pub fn average_by_category<K: Key>(frame: &LongFrame<K>) -> AggregatedFrame<K> {
    let rows = frame
        .group_by(|row| (row.index.clone(), row.pattern.clone()))
        .aggregate(|(index, pattern), group| {
            // Sorted summation keeps the mean independent of row order.
            let mut scores: Vec<f64> = group.iter().map(|row| row.score).collect();
            scores.sort_by(f64::total_cmp);
            let score = scores.iter().sum::<f64>() / scores.len() as f64;

            FrameRow {
                index: index.clone(),
                pattern: pattern.clone(),
                score,
                count: group.iter().map(|row| row.count).sum(),
            }
        });

    AggregatedFrame::from_sorted(rows)
}

/// One row per (index, pattern), sorted by key, with keyed lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedFrame<K> {
    rows: Frame<FrameRow<K>>,
    #[serde(skip)]
    lookup: BTreeMap<K, BTreeMap<String, usize>>,
}

impl<K: Key> AggregatedFrame<K> {
    fn from_sorted(rows: Frame<FrameRow<K>>) -> Self {
        let mut lookup: BTreeMap<K, BTreeMap<String, usize>> = BTreeMap::new();
        for (position, row) in rows.iter().enumerate() {
            lookup
                .entry(row.index.clone())
                .or_default()
                .insert(row.pattern.clone(), position);
        }
        AggregatedFrame { rows, lookup }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the rows, sorted by index then pattern.
    pub fn rows(&self) -> &[FrameRow<K>] {
        self.rows.rows()
    }

    pub fn frame(&self) -> &Frame<FrameRow<K>> {
        &self.rows
    }

    /// Get the row of an (index, pattern) pair.
    pub fn get(&self, index: &K, pattern: &str) -> Option<&FrameRow<K>> {
        let position = *self.lookup.get(index)?.get(pattern)?;
        self.rows.rows().get(position)
    }

    /// Distinct indices, sorted.
    pub fn indices(&self) -> impl Iterator<Item = &K> {
        self.lookup.keys()
    }

    /// The aggregated rows as a long frame, ready to be aggregated again.
    pub fn to_long(&self) -> LongFrame<K> {
        self.rows.clone()
    }
}

/// A pattern of the selected recording, flagged when it belongs to the
/// category's defining patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRow {
    pub pattern: String,
    pub score: f64,
    pub is_defining: bool,
}

/// An [`AnnotatedRow`] tagged with the recording it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecordingRow {
    /// Position of the recording in the input collection.
    pub recording: usize,
    pub pattern: String,
    pub score: f64,
    pub is_defining: bool,
}

/// Pattern scores of the recording tagged with `category`, annotated with
/// whether each pattern occurs inside one of the category's defining patterns.
///
/// When several recordings carry `category` the last one wins, so the frame
/// always holds one row per vocabulary pattern. Use
/// [`category_recordings_frame`] to keep every recording.
///
/// The check is a substring test: `"a-b"` is defining when a defining
/// pattern is `"a-b"` or `"x a-b"`.
pub fn category_frame<C: Key>(
    distributions: &[Distribution],
    category: &C,
    recording_categories: &[C],
    defining_patterns: &HashMap<C, Vec<String>>,
) -> Result<Frame<AnnotatedRow>> {
    let (defining, selected) =
        select_category(distributions, category, recording_categories, defining_patterns)?;
    let Some(&(_, distribution)) = selected.last() else {
        return Err(no_recording(category));
    };

    Ok(distribution
        .iter()
        .map(|weight| AnnotatedRow {
            pattern: weight.pattern.clone(),
            score: weight.score,
            is_defining: is_defining(defining, &weight.pattern),
        })
        .collect())
}

/// Like [`category_frame`], but keeps the rows of every recording tagged
/// with `category`, in recording order.
pub fn category_recordings_frame<C: Key>(
    distributions: &[Distribution],
    category: &C,
    recording_categories: &[C],
    defining_patterns: &HashMap<C, Vec<String>>,
) -> Result<Frame<AnnotatedRecordingRow>> {
    let (defining, selected) =
        select_category(distributions, category, recording_categories, defining_patterns)?;
    if selected.is_empty() {
        return Err(no_recording(category));
    }

    Ok(selected
        .into_iter()
        .flat_map(|(recording, distribution)| {
            distribution.iter().map(move |weight| AnnotatedRecordingRow {
                recording,
                pattern: weight.pattern.clone(),
                score: weight.score,
                is_defining: is_defining(defining, &weight.pattern),
            })
        })
        .collect())
}

/// The category's defining patterns and the (position, distribution) pairs
/// tagged with it.
fn select_category<'a, C: Key>(
    distributions: &'a [Distribution],
    category: &C,
    recording_categories: &[C],
    defining_patterns: &'a HashMap<C, Vec<String>>,
) -> Result<(&'a [String], Vec<(usize, &'a Distribution)>)> {
    if distributions.len() != recording_categories.len() {
        return Err(NawbaError::invalid_argument(format!(
            "{} distributions but {} recording categories",
            distributions.len(),
            recording_categories.len()
        )));
    }

    let defining = defining_patterns.get(category).ok_or_else(|| {
        NawbaError::unmapped_key(format!("no defining patterns for category {category:?}"))
    })?;

    let selected = distributions
        .iter()
        .zip(recording_categories)
        .enumerate()
        .filter(|(_, (_, c))| *c == category)
        .map(|(position, (distribution, _))| (position, distribution))
        .collect();

    Ok((defining.as_slice(), selected))
}

fn is_defining(defining: &[String], pattern: &str) -> bool {
    defining.iter().any(|p| p.contains(pattern))
}

fn no_recording<C: Key>(category: &C) -> NawbaError {
    NawbaError::unmapped_key(format!("no recording carries category {category:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::distribution::PatternWeight;

    fn distribution(entries: &[(&str, f64, usize)]) -> Distribution {
        Distribution::from_entries(
            entries
                .iter()
                .map(|(pattern, score, count)| PatternWeight {
                    pattern: pattern.to_string(),
                    score: *score,
                    count: *count,
                })
                .collect(),
        )
    }

    fn three_recordings() -> Vec<Distribution> {
        vec![
            distribution(&[("x", 0.2, 1), ("y", 0.0, 0)]),
            distribution(&[("x", 0.4, 2), ("y", 0.1, 1)]),
            distribution(&[("x", 0.0, 0), ("y", 0.6, 4)]),
        ]
    }

    #[test]
    fn test_zip_to_frame() {
        let frame = zip_to_frame(&three_recordings(), &["A", "A", "B"]).unwrap();
        assert_eq!(frame.len(), 6);
        assert_eq!(frame.rows()[2].index, "A");
        assert_eq!(frame.rows()[2].pattern, "x");
        assert_eq!(frame.rows()[5].index, "B");
    }

    #[test]
    fn test_zip_to_frame_length_mismatch() {
        let err = zip_to_frame(&three_recordings(), &["A"]).unwrap_err();
        assert!(matches!(err, NawbaError::InvalidArgument(_)));
    }

    #[test]
    fn test_average_by_category() {
        let frame = zip_to_frame(&three_recordings(), &["A", "A", "B"]).unwrap();
        let aggregated = average_by_category(&frame);

        assert_eq!(aggregated.len(), 4);
        let x = aggregated.get(&"A", "x").unwrap();
        assert_eq!(x.count, 3);
        assert!((x.score - 0.3).abs() < 1e-12);

        let y = aggregated.get(&"B", "y").unwrap();
        assert_eq!(y.count, 4);
        assert!((y.score - 0.6).abs() < 1e-12);

        assert!(aggregated.get(&"C", "x").is_none());
        assert_eq!(aggregated.indices().copied().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_aggregated_rows_are_sorted() {
        let frame = zip_to_frame(&three_recordings(), &[2, 1, 2]).unwrap();
        let aggregated = average_by_category(&frame);
        let keys: Vec<(i32, &str)> = aggregated
            .rows()
            .iter()
            .map(|row| (row.index, row.pattern.as_str()))
            .collect();
        assert_eq!(keys, vec![(1, "x"), (1, "y"), (2, "x"), (2, "y")]);
    }

    #[test]
    fn test_reaggregating_is_stable() {
        let frame = zip_to_frame(&three_recordings(), &["A", "A", "B"]).unwrap();
        let once = average_by_category(&frame);
        let twice = average_by_category(&once.to_long());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_category_frame_takes_last_recording() {
        let mut defining = HashMap::new();
        defining.insert("A", vec!["x z".to_string()]);
        defining.insert("B", vec!["q".to_string()]);

        let frame = category_frame(&three_recordings(), &"A", &["A", "B", "A"], &defining).unwrap();

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.rows()[0].pattern, "x");
        assert_eq!(frame.rows()[0].score, 0.0);
        assert_eq!(frame.rows()[1].score, 0.6);
        assert!(frame.rows()[0].is_defining);
        assert!(!frame.rows()[1].is_defining);
    }

    #[test]
    fn test_category_frame_single_row_per_pattern() {
        let distributions = vec![
            distribution(&[("p", 0.1, 1)]),
            distribution(&[("p", 0.9, 3)]),
        ];
        let mut defining = HashMap::new();
        defining.insert("A", vec!["p".to_string()]);

        let frame = category_frame(&distributions, &"A", &["A", "A"], &defining).unwrap();
        let scores: Vec<f64> = frame.iter().map(|row| row.score).collect();
        assert_eq!(scores, vec![0.9]);
    }

    #[test]
    fn test_category_recordings_frame_keeps_every_recording() {
        let mut defining = HashMap::new();
        defining.insert("A", vec!["x z".to_string()]);

        let frame =
            category_recordings_frame(&three_recordings(), &"A", &["A", "B", "A"], &defining)
                .unwrap();

        assert_eq!(frame.len(), 4);
        assert_eq!(frame.rows()[0].recording, 0);
        assert_eq!(frame.rows()[0].score, 0.2);
        assert_eq!(frame.rows()[2].recording, 2);
        assert!(frame.rows()[2].is_defining);
        assert!(!frame.rows()[3].is_defining);
    }

    #[test]
    fn test_category_frame_unknown_category() {
        let mut defining = HashMap::new();
        defining.insert("A", vec!["x".to_string()]);
        defining.insert("C", vec!["x".to_string()]);

        let err = category_frame(&three_recordings(), &"B", &["A", "A", "A"], &defining)
            .unwrap_err();
        assert!(matches!(err, NawbaError::UnmappedKey(_)));

        let err = category_frame(&three_recordings(), &"C", &["A", "A", "A"], &defining)
            .unwrap_err();
        assert!(matches!(err, NawbaError::UnmappedKey(_)));

        let err =
            category_recordings_frame(&three_recordings(), &"C", &["A", "A", "A"], &defining)
                .unwrap_err();
        assert!(matches!(err, NawbaError::UnmappedKey(_)));
    }
}
