//! Error types for batch ingestion and layout configuration.
//!
//! # Error Handling Strategy
//!
//! Errors only exist at the edges of this crate:
//!
//! - [`IngestError`]: a batch document that cannot be turned into lineage records
//!   (invalid JSON, an entry with a non-array table list, a missing id, duplicate
//!   ids). Raised by [`crate::ingest`] before anything reaches the builder.
//!
//! - [`ConfigError`]: a [`crate::LayoutConfig`] with values the columnar layout
//!   cannot use.
//!
//! Analyzer failures are not errors here: an entry carrying an `error` field is
//! recorded as a [`crate::SkippedEntry`] and the rest of the batch proceeds. The
//! builder and the view have no error paths at all.

use thiserror::Error;

use crate::types::RecordId;

/// Error raised while turning a batch document into lineage records.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The document is not valid JSON.
    #[error("Invalid batch JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An entry exists but does not match the record contract.
    #[error("Malformed entry at index {index}: {message}")]
    Malformed { index: usize, message: String },

    /// Two graphable entries share the same id.
    #[error("Duplicate record id: {id}")]
    DuplicateId { id: RecordId },

    /// The top-level JSON value is neither an array nor an `{ "entries": [...] }` object.
    #[error("Unsupported batch document: expected an array or an object with an `entries` array")]
    UnsupportedDocument,
}

impl IngestError {
    pub fn malformed(index: usize, message: impl Into<String>) -> Self {
        IngestError::Malformed {
            index,
            message: message.into(),
        }
    }
}

/// Error raised when validating a layout configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Layout value `{field}` must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("Layout value `{field}` must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("Layout value `{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}
