#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::ops::Bound;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{Column, IndexKey, ScanClient, ScanRange, ScanResult};

type Row = BTreeMap<String, Vec<u8>>;
type Family = BTreeMap<IndexKey, Row>;

/// In-memory sorted wide-column store.
///
/// Rows are kept per column family in key order, columns within a row in
/// name order, matching the scan semantics of the on-disk stores this crate
/// targets. The store is the embedded backend for tests and benches and the
/// reference implementation of the inclusive-bound range contract.
#[derive(Default)]
pub struct MemoryScanClient {
    families: RwLock<FxHashMap<String, Family>>,
}

impl MemoryScanClient {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one column of one row, creating family and row as needed.
    pub fn put(
        &self,
        family: &str,
        row_key: impl Into<IndexKey>,
        column: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) {
        let mut families = self.families.write();
        families
            .entry(family.to_owned())
            .or_default()
            .entry(row_key.into())
            .or_default()
            .insert(column.into(), value.into());
    }

    /// Registers `row_key` of the primary family under an index entry:
    /// one value-keyed index row gains a column named after the object row.
    pub fn put_index_entry(
        &self,
        index: &str,
        value_key: impl Into<IndexKey>,
        object_key: impl Into<String>,
    ) {
        self.put(index, value_key, object_key, Vec::new());
    }

    /// Number of rows currently stored in a family.
    pub fn row_count(&self, family: &str) -> usize {
        self.families
            .read()
            .get(family)
            .map(|rows| rows.len())
            .unwrap_or(0)
    }
}

impl ScanClient for MemoryScanClient {
    fn point_scan(
        &self,
        family: &str,
        row_key: &[u8],
        max_columns: usize,
    ) -> ScanResult<Vec<Column>> {
        let families = self.families.read();
        let columns = families
            .get(family)
            .and_then(|rows| rows.get(row_key))
            .map(|row| {
                row.iter()
                    .take(max_columns)
                    .map(|(name, value)| Column::new(name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(columns)
    }

    fn range_scan(
        &self,
        family: &str,
        range: &ScanRange,
        max_columns_per_row: usize,
    ) -> ScanResult<Vec<(IndexKey, Vec<Column>)>> {
        if let (Some(start), Some(end)) = (&range.start, &range.end) {
            if start > end {
                return Err("malformed range: start key after end key".into());
            }
        }
        let families = self.families.read();
        let Some(rows) = families.get(family) else {
            return Ok(Vec::new());
        };
        let start = match &range.start {
            Some(key) => Bound::Included(key.clone()),
            None => Bound::Unbounded,
        };
        let end = match &range.end {
            Some(key) => Bound::Included(key.clone()),
            None => Bound::Unbounded,
        };
        let selected = rows
            .range((start, end))
            .take(range.limit)
            .map(|(key, row)| {
                let columns = row
                    .iter()
                    .take(max_columns_per_row)
                    .map(|(name, value)| Column::new(name.clone(), value.clone()))
                    .collect();
                (key.clone(), columns)
            })
            .collect();
        Ok(selected)
    }
}
