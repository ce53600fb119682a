//! Ordered record sequences with group-by aggregation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::pivot::{PivotAggregation, PivotTable};

/// An ordered sequence of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame<R> {
    rows: Vec<R>,
}

impl<R> Frame<R> {
    /// Create an empty frame.
    pub fn new() -> Self {
        Frame { rows: Vec::new() }
    }

    /// Create a frame from records, keeping their order.
    pub fn from_rows(rows: Vec<R>) -> Self {
        Frame { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    pub fn push(&mut self, row: R) {
        self.rows.push(row);
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    /// Keep the records matching `predicate`, in order.
    pub fn filter<F>(&self, predicate: F) -> Frame<R>
    where
        R: Clone,
        F: Fn(&R) -> bool,
    {
        self.rows.iter().filter(|row| predicate(row)).cloned().collect()
    }

    /// Transform every record.
    pub fn map<T, F>(&self, f: F) -> Frame<T>
    where
        F: Fn(&R) -> T,
    {
        self.rows.iter().map(f).collect()
    }

    /// Group records by key. Groups are ordered by key; records inside a
    /// group keep their frame order.
    pub fn group_by<K, F>(&self, key: F) -> GroupBy<'_, K, R>
    where
        K: Ord,
        F: Fn(&R) -> K,
    {
        let mut groups: BTreeMap<K, Vec<&R>> = BTreeMap::new();
        for row in &self.rows {
            groups.entry(key(row)).or_default().push(row);
        }
        GroupBy { groups }
    }

    /// Spread records into a wide table of `index` x `column` cells.
    ///
    /// Records sharing a cell are combined with `aggregation`. Cells with no
    /// record stay missing.
    pub fn pivot<I, C, FI, FC, FV>(
        &self,
        index: FI,
        column: FC,
        value: FV,
        aggregation: PivotAggregation,
    ) -> PivotTable<I, C>
    where
        I: Ord + Clone,
        C: Ord + Clone,
        FI: Fn(&R) -> I,
        FC: Fn(&R) -> C,
        FV: Fn(&R) -> f64,
    {
        PivotTable::build(&self.rows, index, column, value, aggregation)
    }
}

impl<R> Default for Frame<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FromIterator<R> for Frame<R> {
    fn from_iter<T: IntoIterator<Item = R>>(iter: T) -> Self {
        Frame {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<R> IntoIterator for Frame<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a Frame<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Records of a [`Frame`] partitioned by key.
#[derive(Debug)]
pub struct GroupBy<'a, K, R> {
    groups: BTreeMap<K, Vec<&'a R>>,
}

impl<'a, K: Ord, R> GroupBy<'a, K, R> {
    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups.keys()
    }

    pub fn get(&self, key: &K) -> Option<&[&'a R]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Collapse every group into one record, in key order.
    pub fn aggregate<T, F>(self, mut f: F) -> Frame<T>
    where
        F: FnMut(&K, &[&'a R]) -> T,
    {
        self.groups
            .iter()
            .map(|(key, rows)| f(key, rows.as_slice()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Sale {
        shop: &'static str,
        item: &'static str,
        amount: f64,
    }

    fn sales() -> Frame<Sale> {
        Frame::from_rows(vec![
            Sale { shop: "b", item: "x", amount: 1.0 },
            Sale { shop: "a", item: "y", amount: 2.0 },
            Sale { shop: "b", item: "x", amount: 3.0 },
            Sale { shop: "a", item: "x", amount: 4.0 },
        ])
    }

    #[test]
    fn test_group_by_orders_by_key() {
        let frame = sales();
        let groups = frame.group_by(|s| s.shop);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(groups.get(&"b").unwrap().len(), 2);
    }

    #[test]
    fn test_aggregate_sums() {
        let frame = sales();
        let totals = frame
            .group_by(|s| (s.shop, s.item))
            .aggregate(|key, rows| (*key, rows.iter().map(|s| s.amount).sum::<f64>()));

        assert_eq!(
            totals.into_rows(),
            vec![(("a", "x"), 4.0), (("a", "y"), 2.0), (("b", "x"), 4.0)]
        );
    }

    #[test]
    fn test_filter_and_map() {
        let frame = sales();
        let only_x = frame.filter(|s| s.item == "x");
        assert_eq!(only_x.len(), 3);

        let amounts = only_x.map(|s| s.amount);
        assert_eq!(amounts.rows(), &[1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_empty_frame() {
        let frame: Frame<Sale> = Frame::new();
        assert!(frame.is_empty());
        assert!(frame.group_by(|s| s.shop).is_empty());
    }
}
