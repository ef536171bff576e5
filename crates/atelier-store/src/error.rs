//! Store error types.

use thiserror::Error;

/// Errors produced by the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A document read inside a transaction changed before commit.
    #[error("document {id} in {collection} was modified concurrently")]
    Conflict { collection: String, id: String },

    /// An update or staged write referenced a document that does not exist.
    #[error("document {id} not found in {collection}")]
    NotFound { collection: String, id: String },

    /// A write payload was not a JSON object.
    #[error("document payload for {collection} must be a JSON object")]
    InvalidPayload { collection: String },

    /// A pagination cursor did not match any document in the result set.
    #[error("unknown cursor: {0}")]
    UnknownCursor(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Check whether the error is a transaction commit conflict.
    ///
    /// Conflicts are transient and safe to retry; every other variant is not.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}
