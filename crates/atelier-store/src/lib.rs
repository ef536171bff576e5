//! In-memory document store with optimistic transactions.
//!
//! Collections of schemaless JSON documents, queried with equality and
//! range filters, one sort key and cursor pagination. Writes clean their
//! payloads of absent fields and stamp `createdAt`/`updatedAt`; reads
//! normalize whatever timestamp form a document holds into [`Timestamp`].
//! The [`Transaction`] primitive provides the store's only atomicity
//! guarantee: all staged writes commit together or not at all, guarded by
//! the version of every document the transaction read.
//!
//! # Example
//!
//! ```rust,ignore
//! use atelier_store::{DocumentStore, Query, Filter};
//!
//! let store = DocumentStore::new();
//! let doc = store.create("products", payload).await?;
//!
//! let mut tx = store.begin();
//! let current = tx.get("products", &doc.id).await;
//! tx.update("products", &doc.id, patch);
//! tx.commit().await?;
//! ```

mod document;
mod error;
mod memory;
mod query;
mod timestamp;
mod txn;

pub use document::{clean, to_payload, Document};
pub use error::StoreError;
pub use memory::DocumentStore;
pub use query::{Filter, Page, Query, SortDirection};
pub use timestamp::Timestamp;
pub use txn::Transaction;
