//! Commerce error types.

use crate::ids::ProductId;
use crate::validate::ValidationErrors;
use atelier_store::StoreError;
use thiserror::Error;

/// Errors that can occur in marketplace operations.
///
/// A closed enumeration so callers can match exhaustively instead of
/// inspecting duck-typed error objects.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Input failed schema constraints. Recoverable locally; never reached
    /// the store.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A referenced document does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A cart line referenced a product that does not exist. Inside order
    /// placement this aborts the whole operation.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Requested quantity exceeds available stock. Never retried.
    #[error(
        "insufficient inventory for {product_id}: requested {requested}, available {available}"
    )]
    InsufficientInventory {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Store contention exhausted the bounded retries.
    #[error("transaction aborted after {attempts} contended attempts")]
    TransactionAborted { attempts: u32 },

    /// Arithmetic overflow in money calculation.
    #[error("arithmetic overflow in money calculation")]
    Overflow,

    /// Entity could not be encoded for persistence.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store-level failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CommerceError {
    /// Business-rule failures are final; only contention-driven aborts are
    /// worth retrying, and the placement layer already does so.
    pub fn is_retryable(&self) -> bool {
        match self {
            CommerceError::Store(e) => e.is_conflict(),
            _ => false,
        }
    }
}
