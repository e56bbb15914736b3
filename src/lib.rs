//! Translation of boolean filter expressions into secondary-index scans
//! against a sorted wide-column store.
//!
//! Given a predicate tree over object fields, [`Evaluator`] decides node by
//! node whether a sub-predicate can be answered by scanning a secondary
//! index; matching row-key sets are merged with set algebra per AND/OR, and
//! anything an index cannot answer degrades to "unknown" plus a flag telling
//! the caller to re-apply the predicate in memory. The evaluator narrows the
//! candidate pool; it never decides membership incorrectly — every give-up
//! path forces the in-memory pass.
//!
//! ```
//! use sift::{Catalog, Evaluator, Expr, MemoryScanClient, ParamBindings};
//!
//! let store = MemoryScanClient::new();
//! store.put_index_entry("People_city_idx", "NYC", "alice");
//! store.put_index_entry("People_city_idx", "SEA", "bob");
//!
//! let catalog = Catalog::new("People").with_utf8_index("city", "People_city_idx");
//! let predicate = Expr::eq(Expr::field("city"), Expr::literal("NYC"));
//!
//! let evaluator = Evaluator::new(&catalog, &store);
//! let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();
//!
//! assert!(!result.requires_in_memory);
//! assert!(result.candidate_keys.unwrap().contains("alice"));
//! ```

pub mod bounds;
pub mod catalog;
pub mod error;
pub mod eval;
pub mod expr;
pub mod rowset;
pub mod scan;

pub use bounds::{adjuster_for, KeyAdjuster, KeyOrdering};
pub use catalog::{Catalog, FieldIndex, SecondaryIndex};
pub use error::{Result, SiftError};
pub use eval::{EvalOptions, Evaluation, Evaluator};
pub use expr::{CompareOp, Expr, ParamBindings, UnsupportedKind, Value};
pub use rowset::{merge, Connective, RowKey, RowSet};
pub use scan::{Column, IndexKey, MemoryScanClient, ScanClient, ScanRange};
