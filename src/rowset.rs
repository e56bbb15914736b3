#![forbid(unsafe_code)]

//! Row-key sets and their AND/OR merge.
//!
//! `None` is a distinct third state from the empty set: an empty set means
//! "definitively zero matches", while `None` means "no index-derived
//! information — do not restrict the candidate pool".

use rustc_hash::FxHashSet;

/// Row/object identifier, as stored in index column names.
pub type RowKey = String;

/// Set of row keys produced by one or more index scans.
pub type RowSet = FxHashSet<RowKey>;

/// Boolean connective joining two sub-predicates' results.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Connective {
    /// Both sides must hold.
    And,
    /// Either side may hold.
    Or,
}

/// Merges two scan results under a connective.
///
/// An unknown (`None`) operand absorbs differently per connective: under AND
/// it contributes no restriction, so the other side's restriction stands;
/// under OR an unrestricted branch makes the whole disjunction unrestricted,
/// so the result is unknown.
pub fn merge(left: Option<RowSet>, right: Option<RowSet>, op: Connective) -> Option<RowSet> {
    match op {
        Connective::And => match (left, right) {
            (None, rhs) => rhs,
            (lhs, None) => lhs,
            (Some(l), Some(r)) => {
                let (mut keep, other) = if l.len() <= r.len() { (l, r) } else { (r, l) };
                keep.retain(|key| other.contains(key));
                Some(keep)
            }
        },
        Connective::Or => match (left, right) {
            (None, _) | (_, None) => None,
            (Some(mut l), Some(r)) => {
                l.extend(r);
                Some(l)
            }
        },
    }
}
