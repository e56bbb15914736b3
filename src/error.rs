#![forbid(unsafe_code)]

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SiftError>;

/// Errors surfaced while translating a predicate tree into index scans.
#[derive(Debug, Error)]
pub enum SiftError {
    /// A point or range scan against the backing store failed. Evaluation of
    /// the whole query aborts; there is no partial-result recovery.
    #[error("scan against '{index}' failed: {source}")]
    Scan {
        /// Index or column family the failed scan targeted.
        index: String,
        /// Underlying store/driver failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The predicate referenced a field path the catalog has no entry for.
    /// A configuration mistake, not a runtime condition.
    #[error("unknown field path '{0}'")]
    UnknownField(String),
    /// The predicate referenced a named parameter with no bound value.
    #[error("no value bound for parameter '{0}'")]
    UnboundParameter(String),
    /// A scan bound could not be adjusted past an ordering extreme.
    #[error("key adjustment: {0}")]
    KeyAdjust(&'static str),
    /// Malformed input that cannot be evaluated.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
}
