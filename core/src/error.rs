//! Error types for normalization, loading and saving.
//!
//! # Design
//! `Rejection` says why one stored element could not become a `Todo`; it
//! never aborts a load. `LoadError` and `SaveError` cover whole-operation
//! failures and are only surfaced by the `try_*` entry points; `load_all`
//! and `save_all` degrade them to an empty list or a no-op.

use thiserror::Error;

/// Why a stored element was dropped by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("element is not a JSON object")]
    NotAnObject,

    #[error("id is missing or empty")]
    MissingId,

    #[error("title is missing or empty")]
    MissingTitle,

    #[error("completed is not a boolean")]
    InvalidCompleted,

    #[error("createdAt is missing or not a string")]
    MissingCreatedAt,

    #[error("createdAt {0:?} is not a valid instant")]
    InvalidCreatedAt(String),
}

/// Errors reported by a `KeyValueStore` backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be read or written at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The write would exceed the store's capacity.
    #[error("quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: usize, limit: usize },
}

/// Whole-load failures. A missing key is not an error.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading store failed: {0}")]
    Store(#[from] StoreError),

    #[error("stored value is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("stored value is not a JSON array")]
    NotAnArray,
}

/// Whole-save failures.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("serializing todos failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("writing store failed: {0}")]
    Store(#[from] StoreError),
}
