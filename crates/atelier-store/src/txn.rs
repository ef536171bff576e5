//! Optimistic transactions.
//!
//! A transaction records the version of every document it reads and stages
//! its writes in memory. `commit` re-checks each recorded version under the
//! store's write lock and applies every staged write only if none changed,
//! which is the all-or-nothing unit the order placement relies on. A
//! version mismatch is a `StoreError::Conflict`, which callers may retry.

use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::document::clean;
use crate::memory::{now_millis, DocumentStore, StoredDocument};
use crate::{Document, StoreError};

/// What a transaction observed when it read a document.
#[derive(Debug, Clone)]
struct ReadRecord {
    collection: String,
    id: String,
    /// Version at read time; `None` when the document was absent.
    version: Option<u64>,
}

#[derive(Debug, Clone)]
enum StagedWrite {
    Create {
        collection: String,
        id: String,
        payload: Map<String, Value>,
    },
    Update {
        collection: String,
        id: String,
        patch: Map<String, Value>,
    },
}

/// An in-flight transaction. Dropped without `commit`, it changes nothing.
pub struct Transaction {
    store: DocumentStore,
    reads: Vec<ReadRecord>,
    writes: Vec<StagedWrite>,
}

impl Transaction {
    pub(crate) fn new(store: DocumentStore) -> Self {
        Self {
            store,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Read a document, recording its version for the commit check.
    ///
    /// Absence is recorded too: a document that appears between read and
    /// commit fails the transaction just like one that changed.
    pub async fn get(&mut self, collection: &str, id: &str) -> Option<Document> {
        let doc = self.store.get(collection, id).await;
        self.reads.push(ReadRecord {
            collection: collection.to_string(),
            id: id.to_string(),
            version: doc.as_ref().map(|d| d.version),
        });
        doc
    }

    /// Stage a document creation under a generated id, returning the id.
    pub fn create(&mut self, collection: &str, payload: Map<String, Value>) -> String {
        let id = Uuid::new_v4().to_string();
        self.writes.push(StagedWrite::Create {
            collection: collection.to_string(),
            id: id.clone(),
            payload,
        });
        id
    }

    /// Stage a shallow merge into an existing document.
    pub fn update(&mut self, collection: &str, id: &str, patch: Map<String, Value>) {
        self.writes.push(StagedWrite::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            patch,
        });
    }

    /// Commit every staged write, or nothing.
    pub async fn commit(self) -> Result<(), StoreError> {
        let mut collections = self.store.inner.write().await;

        for read in &self.reads {
            let current = collections
                .get(&read.collection)
                .and_then(|c| c.get(&read.id))
                .map(|stored| stored.version);
            if current != read.version {
                debug!(
                    collection = %read.collection,
                    id = %read.id,
                    "transaction commit conflict"
                );
                return Err(StoreError::Conflict {
                    collection: read.collection.clone(),
                    id: read.id.clone(),
                });
            }
        }

        let now = now_millis();
        for write in self.writes {
            match write {
                StagedWrite::Create {
                    collection,
                    id,
                    payload,
                } => {
                    let mut data = cleaned(&collection, payload)?;
                    data.insert("createdAt".to_string(), Value::from(now));
                    data.insert("updatedAt".to_string(), Value::from(now));
                    collections
                        .entry(collection)
                        .or_default()
                        .insert(id, StoredDocument { data, version: 1 });
                }
                StagedWrite::Update {
                    collection,
                    id,
                    patch,
                } => {
                    let patch = cleaned(&collection, patch)?;
                    let stored = collections
                        .get_mut(&collection)
                        .and_then(|c| c.get_mut(&id))
                        .ok_or(StoreError::NotFound { collection, id })?;
                    for (key, value) in patch {
                        stored.data.insert(key, value);
                    }
                    stored
                        .data
                        .insert("updatedAt".to_string(), Value::from(now));
                    stored.version += 1;
                }
            }
        }

        Ok(())
    }
}

fn cleaned(
    collection: &str,
    payload: Map<String, Value>,
) -> Result<Map<String, Value>, StoreError> {
    match clean(Value::Object(payload)) {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::InvalidPayload {
            collection: collection.to_string(),
        }),
    }
}
