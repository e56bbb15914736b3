#![forbid(unsafe_code)]

//! Scan-bound adjustment ("bump up" / "bump down").
//!
//! The backing store's range scans take inclusive bounds on both sides, so a
//! strict comparison has to move its bound to the adjacent key first: `> k`
//! scans from the key immediately after `k`, `< k` scans up to the key
//! immediately before it. How "adjacent" is computed depends on the ordering
//! the index declared for its row keys, so the adjustment is a strategy
//! looked up per index.

use crate::error::{Result, SiftError};

/// Declared byte ordering of a secondary index's row keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum KeyOrdering {
    /// UTF-8 text compared bytewise; adjustment moves the final byte.
    Utf8,
    /// Fixed-width big-endian binary word; adjustment carries across bytes.
    FixedBinary,
}

/// Computes the adjacent key in an index's sort order.
pub trait KeyAdjuster {
    /// Smallest key strictly greater than `key`.
    fn next(&self, key: &[u8]) -> Result<Vec<u8>>;
    /// Largest key strictly less than `key`.
    fn prev(&self, key: &[u8]) -> Result<Vec<u8>>;
}

/// Returns the adjustment strategy for an index's declared ordering.
pub fn adjuster_for(ordering: KeyOrdering) -> &'static dyn KeyAdjuster {
    match ordering {
        KeyOrdering::Utf8 => &Utf8Adjuster,
        KeyOrdering::FixedBinary => &FixedBinaryAdjuster,
    }
}

/// Bumps UTF-8 text keys by stepping the final byte.
///
/// Valid UTF-8 never contains 0xff, and text keys do not end in NUL, so the
/// final byte always has room to move in both directions; hitting either
/// extreme is reported as an error rather than silently clamped.
pub struct Utf8Adjuster;

impl KeyAdjuster for Utf8Adjuster {
    fn next(&self, key: &[u8]) -> Result<Vec<u8>> {
        let mut bumped = key.to_vec();
        match bumped.last_mut() {
            None => Err(SiftError::KeyAdjust("cannot bump an empty key")),
            Some(0xff) => Err(SiftError::KeyAdjust("key already at ordering maximum")),
            Some(last) => {
                *last += 1;
                Ok(bumped)
            }
        }
    }

    fn prev(&self, key: &[u8]) -> Result<Vec<u8>> {
        let mut bumped = key.to_vec();
        match bumped.last_mut() {
            None => Err(SiftError::KeyAdjust("cannot bump an empty key")),
            Some(0x00) => Err(SiftError::KeyAdjust("key already at ordering minimum")),
            Some(last) => {
                *last -= 1;
                Ok(bumped)
            }
        }
    }
}

/// Bumps fixed-width binary keys by incrementing or decrementing the whole
/// word, big-endian, with carry/borrow.
pub struct FixedBinaryAdjuster;

impl KeyAdjuster for FixedBinaryAdjuster {
    fn next(&self, key: &[u8]) -> Result<Vec<u8>> {
        if key.is_empty() {
            return Err(SiftError::KeyAdjust("cannot bump an empty key"));
        }
        let mut bumped = key.to_vec();
        for byte in bumped.iter_mut().rev() {
            if *byte < 0xff {
                *byte += 1;
                return Ok(bumped);
            }
            *byte = 0x00;
        }
        Err(SiftError::KeyAdjust("key already at ordering maximum"))
    }

    fn prev(&self, key: &[u8]) -> Result<Vec<u8>> {
        if key.is_empty() {
            return Err(SiftError::KeyAdjust("cannot bump an empty key"));
        }
        let mut bumped = key.to_vec();
        for byte in bumped.iter_mut().rev() {
            if *byte > 0x00 {
                *byte -= 1;
                return Ok(bumped);
            }
            *byte = 0xff;
        }
        Err(SiftError::KeyAdjust("key already at ordering minimum"))
    }
}
