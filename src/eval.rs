#![forbid(unsafe_code)]

//! Recursive translation of predicate trees into secondary-index scans.
//!
//! The walk is strict post-order: each node's children are fully resolved
//! before the node combines them. Every node yields one [`Outcome`]; a
//! comparison pairs the index resolved by its field child with the key
//! encoded by its literal/parameter child and issues the matching scan. A
//! node that cannot be answered from an index yields "unknown" and raises
//! the monotonic in-memory flag — the evaluator only ever *narrows* the
//! candidate pool, it never decides membership on its own. When the flag is
//! set, the caller must re-apply the full predicate over the materialized
//! candidates (or over the whole extent when no candidate set was produced).

use tracing::{debug, warn};

use crate::bounds::adjuster_for;
use crate::catalog::{Catalog, SecondaryIndex};
use crate::error::{Result, SiftError};
use crate::expr::{CompareOp, Expr, ParamBindings};
use crate::rowset::{merge, Connective, RowSet};
use crate::scan::{IndexKey, ScanClient, ScanFailure, ScanRange};

/// Tuning knobs for one evaluation.
#[derive(Clone, Copy, Debug)]
pub struct EvalOptions {
    /// Cap applied to every scan, both rows and columns. A result that
    /// fills the cap is still treated as complete for merging; the
    /// truncation is logged. Queries over index cardinalities near this cap
    /// should lower their expectations or raise it.
    pub scan_limit: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self { scan_limit: 10_000 }
    }
}

/// Final answer of one predicate-tree walk.
#[derive(Clone, Debug)]
pub struct Evaluation {
    /// Row keys narrowed by index scans; `None` means no index-derived
    /// restriction exists and every candidate must be considered.
    pub candidate_keys: Option<RowSet>,
    /// When set, the candidate keys are candidates *only*: the caller must
    /// re-apply the original predicate in memory.
    pub requires_in_memory: bool,
}

/// What one node contributed to its parent.
enum Outcome {
    /// Field leaf: the resolved secondary index, if the field has one.
    Index(Option<SecondaryIndex>),
    /// Literal or parameter leaf: encoded candidate index key.
    Key(IndexKey),
    /// Interior node: a row-key set, or `None` for unknown.
    Rows(Option<RowSet>),
}

/// Accumulator threaded through the recursion. The flag is monotonic: once
/// raised it survives every subsequent node outcome.
#[derive(Default)]
struct Walk {
    in_memory_required: bool,
}

/// Translates one predicate tree into index scans against a shared store.
///
/// An evaluator borrows its collaborators read-only and holds no per-query
/// mutable state, but it is built for one query execution at a time: create
/// one, call [`Evaluator::evaluate`], read the result.
pub struct Evaluator<'a, S: ScanClient + ?Sized> {
    catalog: &'a Catalog,
    client: &'a S,
    options: EvalOptions,
}

impl<'a, S: ScanClient + ?Sized> Evaluator<'a, S> {
    /// Evaluator with default options.
    pub fn new(catalog: &'a Catalog, client: &'a S) -> Self {
        Self::with_options(catalog, client, EvalOptions::default())
    }

    /// Evaluator with explicit options.
    pub fn with_options(catalog: &'a Catalog, client: &'a S, options: EvalOptions) -> Self {
        Self {
            catalog,
            client,
            options,
        }
    }

    /// Walks the predicate post-order and returns the narrowed candidate
    /// set plus the in-memory flag.
    pub fn evaluate(&self, predicate: &Expr, params: &ParamBindings) -> Result<Evaluation> {
        let mut walk = Walk::default();
        let outcome = self.eval_node(predicate, params, &mut walk)?;
        let candidate_keys = coerce_rows(outcome, &mut walk);
        Ok(Evaluation {
            candidate_keys,
            requires_in_memory: walk.in_memory_required,
        })
    }

    fn eval_node(&self, expr: &Expr, params: &ParamBindings, walk: &mut Walk) -> Result<Outcome> {
        match expr {
            Expr::Field(path) => self.eval_field(path, walk),
            Expr::Literal(value) => {
                debug!(%value, "eval.literal");
                Ok(Outcome::Key(value.encode_key()))
            }
            Expr::Parameter(name) => {
                let value = params
                    .get(name)
                    .ok_or_else(|| SiftError::UnboundParameter(name.clone()))?;
                debug!(name = %name, %value, "eval.param");
                Ok(Outcome::Key(value.encode_key()))
            }
            Expr::Compare { op, left, right } => {
                let left = self.eval_node(left, params, walk)?;
                let right = self.eval_node(right, params, walk)?;
                self.eval_compare(*op, left, right, walk)
            }
            Expr::And(left, right) => self.eval_connective(Connective::And, left, right, params, walk),
            Expr::Or(left, right) => self.eval_connective(Connective::Or, left, right, params, walk),
            Expr::Invoke { target, method, .. } => self.eval_invoke(target, method, walk),
            Expr::Unsupported { kind, children } => {
                // Children are still walked: any scans or flags they produce
                // must happen even though this node discards their outcomes.
                for child in children {
                    let _ = self.eval_node(child, params, walk)?;
                }
                debug!(kind = ?kind, "eval.unsupported");
                walk.in_memory_required = true;
                Ok(Outcome::Rows(None))
            }
        }
    }

    fn eval_field(&self, path: &str, walk: &mut Walk) -> Result<Outcome> {
        let resolved = self.catalog.resolve(path)?;
        if resolved.index.is_none() {
            warn!(field = %path, "eval.field.unindexed");
            walk.in_memory_required = true;
        }
        Ok(Outcome::Index(resolved.index))
    }

    fn eval_connective(
        &self,
        op: Connective,
        left: &Expr,
        right: &Expr,
        params: &ParamBindings,
        walk: &mut Walk,
    ) -> Result<Outcome> {
        let left = self.eval_node(left, params, walk)?;
        let right = self.eval_node(right, params, walk)?;
        let left = coerce_rows(left, walk);
        let right = coerce_rows(right, walk);
        debug!(op = ?op, "eval.connective");
        Ok(Outcome::Rows(merge(left, right, op)))
    }

    fn eval_compare(
        &self,
        op: CompareOp,
        left: Outcome,
        right: Outcome,
        walk: &mut Walk,
    ) -> Result<Outcome> {
        let Some((index, key)) = pair(left, right) else {
            // One side was compound, unindexed, or keyless: nothing to scan,
            // and the result of this comparison can only come from memory.
            debug!(op = op.symbol(), "eval.cmp.unpaired");
            walk.in_memory_required = true;
            return Ok(Outcome::Rows(None));
        };
        debug!(op = op.symbol(), index = %index.name, "eval.cmp");
        let limit = self.options.scan_limit;
        let adjuster = adjuster_for(index.ordering);
        let rows = match op {
            CompareOp::Eq => self.point(&index.name, &key)?,
            CompareOp::Ge => self.range(&index.name, ScanRange::from_key(key, limit))?,
            CompareOp::Gt => {
                self.range(&index.name, ScanRange::from_key(adjuster.next(&key)?, limit))?
            }
            CompareOp::Le => self.range(&index.name, ScanRange::to_key(key, limit))?,
            CompareOp::Lt => self.range(&index.name, ScanRange::to_key(adjuster.prev(&key)?, limit))?,
            CompareOp::Ne => {
                // Everything strictly below the key, then everything strictly
                // above it; the exact key is excluded by construction.
                let mut below =
                    self.range(&index.name, ScanRange::to_key(adjuster.prev(&key)?, limit))?;
                let above =
                    self.range(&index.name, ScanRange::from_key(adjuster.next(&key)?, limit))?;
                below.extend(above);
                below
            }
        };
        Ok(Outcome::Rows(Some(rows)))
    }

    /// An invocation may reference arbitrary object state, so the only safe
    /// candidate pool is every row of the primary family. Expensive; query
    /// authors are warned to avoid it.
    fn eval_invoke(&self, target: &str, method: &str, walk: &mut Walk) -> Result<Outcome> {
        warn!(%target, %method, "eval.invoke.full_extent");
        let family = self.catalog.primary_storage();
        let range = ScanRange::all(self.options.scan_limit);
        let rows = self
            .client
            .range_scan(family, &range, 0)
            .map_err(|source| wrap_scan(family, source))?;
        self.check_truncation(family, rows.len());
        let set: RowSet = rows
            .into_iter()
            .map(|(key, _)| String::from_utf8_lossy(&key).into_owned())
            .collect();
        walk.in_memory_required = true;
        Ok(Outcome::Rows(Some(set)))
    }

    fn point(&self, index: &str, key: &[u8]) -> Result<RowSet> {
        let columns = self
            .client
            .point_scan(index, key, self.options.scan_limit)
            .map_err(|source| wrap_scan(index, source))?;
        self.check_truncation(index, columns.len());
        Ok(columns.into_iter().map(|column| column.name).collect())
    }

    fn range(&self, index: &str, range: ScanRange) -> Result<RowSet> {
        let rows = self
            .client
            .range_scan(index, &range, self.options.scan_limit)
            .map_err(|source| wrap_scan(index, source))?;
        self.check_truncation(index, rows.len());
        Ok(rows
            .into_iter()
            .flat_map(|(_, columns)| columns)
            .map(|column| column.name)
            .collect())
    }

    fn check_truncation(&self, index: &str, returned: usize) {
        if returned >= self.options.scan_limit {
            warn!(
                index = %index,
                limit = self.options.scan_limit,
                "scan.result.truncated"
            );
        }
    }
}

fn wrap_scan(index: &str, source: ScanFailure) -> SiftError {
    SiftError::Scan {
        index: index.to_owned(),
        source,
    }
}

/// Pairs a comparison's two child outcomes into (index, key), accepting the
/// field and the value in either order. Anything else is unpaired.
fn pair(left: Outcome, right: Outcome) -> Option<(SecondaryIndex, IndexKey)> {
    match (left, right) {
        (Outcome::Index(Some(index)), Outcome::Key(key))
        | (Outcome::Key(key), Outcome::Index(Some(index))) => Some((index, key)),
        _ => None,
    }
}

/// Views an outcome as a row set. A bare index or key surfacing where a
/// boolean result belongs means the tree paired operands in a shape no scan
/// can answer; that branch degrades to unknown and forces the memory pass.
fn coerce_rows(outcome: Outcome, walk: &mut Walk) -> Option<RowSet> {
    match outcome {
        Outcome::Rows(rows) => rows,
        Outcome::Index(_) | Outcome::Key(_) => {
            walk.in_memory_required = true;
            None
        }
    }
}
