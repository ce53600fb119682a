//! Wide tables built by pivoting a frame.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How records landing in the same pivot cell are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotAggregation {
    #[default]
    Mean,
    Sum,
}

/// A dense `index` x `column` table whose cells may be missing.
///
/// Row keys and column keys are both sorted. A cell is `None` when no record
/// carried that (row, column) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable<I, C> {
    index: Vec<I>,
    columns: Vec<C>,
    cells: Vec<Vec<Option<f64>>>,
    row_lookup: BTreeMap<I, usize>,
    column_lookup: BTreeMap<C, usize>,
}

impl<I: Ord + Clone, C: Ord + Clone> PivotTable<I, C> {
    pub(crate) fn build<R, FI, FC, FV>(
        rows: &[R],
        index: FI,
        column: FC,
        value: FV,
        aggregation: PivotAggregation,
    ) -> Self
    where
        FI: Fn(&R) -> I,
        FC: Fn(&R) -> C,
        FV: Fn(&R) -> f64,
    {
        let mut accumulated: BTreeMap<(I, C), (f64, usize)> = BTreeMap::new();
        for row in rows {
            let cell = accumulated
                .entry((index(row), column(row)))
                .or_insert((0.0, 0));
            cell.0 += value(row);
            cell.1 += 1;
        }

        let mut row_lookup: BTreeMap<I, usize> = BTreeMap::new();
        let mut column_lookup: BTreeMap<C, usize> = BTreeMap::new();
        for (i, c) in accumulated.keys() {
            row_lookup.entry(i.clone()).or_insert(0);
            column_lookup.entry(c.clone()).or_insert(0);
        }
        for (position, slot) in row_lookup.values_mut().enumerate() {
            *slot = position;
        }
        for (position, slot) in column_lookup.values_mut().enumerate() {
            *slot = position;
        }

        let mut cells = vec![vec![None; column_lookup.len()]; row_lookup.len()];
        for ((i, c), (sum, count)) in accumulated {
            let r = row_lookup[&i];
            let k = column_lookup[&c];
            cells[r][k] = Some(match aggregation {
                PivotAggregation::Mean => sum / count as f64,
                PivotAggregation::Sum => sum,
            });
        }

        PivotTable {
            index: row_lookup.keys().cloned().collect(),
            columns: column_lookup.keys().cloned().collect(),
            cells,
            row_lookup,
            column_lookup,
        }
    }

    /// Row keys, sorted.
    pub fn index(&self) -> &[I] {
        &self.index
    }

    /// Column keys, sorted.
    pub fn columns(&self) -> &[C] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Cells of one row, aligned with [`PivotTable::columns`].
    pub fn row(&self, position: usize) -> Option<&[Option<f64>]> {
        self.cells.get(position).map(Vec::as_slice)
    }

    pub fn row_position(&self, key: &I) -> Option<usize> {
        self.row_lookup.get(key).copied()
    }

    pub fn column_position(&self, key: &C) -> Option<usize> {
        self.column_lookup.get(key).copied()
    }

    /// The cell at (`row`, `column`); `None` if either key is unknown or
    /// the cell is missing.
    pub fn get(&self, row: &I, column: &C) -> Option<f64> {
        let r = self.row_position(row)?;
        let c = self.column_position(column)?;
        self.cells[r][c]
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|cell| cell.is_none()).count())
            .sum()
    }

    /// Consume the table into its parts: row keys, column keys and cells.
    pub fn into_parts(self) -> (Vec<I>, Vec<C>, Vec<Vec<Option<f64>>>) {
        (self.index, self.columns, self.cells)
    }
}
