//! In-memory tabular data.
//!
//! A [`Frame`] is an ordered sequence of typed records. Two reshaping
//! operations are defined on it:
//!
//! - [`Frame::group_by`] followed by [`GroupBy::aggregate`] collapses records
//!   sharing a key into one output record per key.
//! - [`Frame::pivot`] spreads records into a wide [`PivotTable`] addressed by
//!   (row key, column key).
//!
//! Both operations order their output by key, so the result never depends on
//! the order of the input records.

pub mod frame;
pub mod pivot;

use std::fmt::Debug;
use std::hash::Hash;

pub use frame::{Frame, GroupBy};
pub use pivot::{PivotAggregation, PivotTable};

/// Bound shared by every value used as a grouping, lookup or class key.
pub trait Key: Ord + Hash + Clone + Debug {}

impl<T: Ord + Hash + Clone + Debug> Key for T {}
