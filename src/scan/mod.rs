#![forbid(unsafe_code)]

//! Driver boundary for the sorted wide-column store.
//!
//! The evaluator never talks to a store directly; it issues point and range
//! scans through [`ScanClient`]. Keys and column names are opaque byte
//! strings with a declared ordering, and both range bounds are inclusive —
//! the strict-comparison cases are handled upstream by bound adjustment.

mod memory;

pub use memory::MemoryScanClient;

use crate::rowset::RowKey;

/// Encoded index row key.
pub type IndexKey = Vec<u8>;

/// Failure raised by a scan client; the evaluator wraps it with the index
/// name before propagating.
pub type ScanFailure = Box<dyn std::error::Error + Send + Sync>;

/// Scan outcome alias used by [`ScanClient`] implementations.
pub type ScanResult<T> = std::result::Result<T, ScanFailure>;

/// Named column within a wide row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
    /// Column name; for secondary-index rows this is a row key of the
    /// primary column family.
    pub name: RowKey,
    /// Column payload, possibly empty.
    pub value: Vec<u8>,
}

impl Column {
    /// Creates a column.
    pub fn new(name: impl Into<RowKey>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One row-range scan request. A range is a value object: built once,
/// never mutated.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanRange {
    /// Inclusive lower bound; `None` scans from the start of the family.
    pub start: Option<IndexKey>,
    /// Inclusive upper bound; `None` scans to the end of the family.
    pub end: Option<IndexKey>,
    /// Maximum number of rows returned.
    pub limit: usize,
}

impl ScanRange {
    /// Unbounded scan over the whole family.
    pub fn all(limit: usize) -> Self {
        Self {
            start: None,
            end: None,
            limit,
        }
    }

    /// Scan from `start` (inclusive) to the end of the family.
    pub fn from_key(start: IndexKey, limit: usize) -> Self {
        Self {
            start: Some(start),
            end: None,
            limit,
        }
    }

    /// Scan from the start of the family to `end` (inclusive).
    pub fn to_key(end: IndexKey, limit: usize) -> Self {
        Self {
            start: None,
            end: Some(end),
            limit,
        }
    }
}

/// Point and range scans against a sorted wide-column store.
///
/// One client may be shared by many concurrently running evaluations, so
/// implementations must be safe for concurrent use.
pub trait ScanClient: Send + Sync {
    /// Returns the columns of a single row in column-name order, capped at
    /// `max_columns`. A missing row is an empty result, not an error.
    fn point_scan(&self, family: &str, row_key: &[u8], max_columns: usize)
        -> ScanResult<Vec<Column>>;

    /// Returns rows within `range` in key order, each with its columns in
    /// column-name order capped at `max_columns_per_row`. Passing zero
    /// selects row keys only.
    fn range_scan(
        &self,
        family: &str,
        range: &ScanRange,
        max_columns_per_row: usize,
    ) -> ScanResult<Vec<(IndexKey, Vec<Column>)>>;
}
