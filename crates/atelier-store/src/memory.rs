//! In-memory document store.
//!
//! Collections of JSON documents behind a shared handle. The handle is
//! `Clone` and cheap to pass around; tests and callers construct their own
//! instead of reaching for process-wide state.

use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::clean;
use crate::{Document, Page, Query, SortDirection, StoreError, Transaction};

/// A stored document: data plus the version used for conflict detection.
#[derive(Debug, Clone)]
pub(crate) struct StoredDocument {
    pub(crate) data: Map<String, Value>,
    pub(crate) version: u64,
}

pub(crate) type Collections = HashMap<String, HashMap<String, StoredDocument>>;

/// Handle to the document store.
#[derive(Clone, Default)]
pub struct DocumentStore {
    pub(crate) inner: Arc<RwLock<Collections>>,
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a document by id. Missing documents are `None`, never an error.
    pub async fn get(&self, collection: &str, id: &str) -> Option<Document> {
        let collections = self.inner.read().await;
        collections
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|stored| Document {
                id: id.to_string(),
                version: stored.version,
                data: stored.data.clone(),
            })
    }

    /// Create a document under a generated id.
    ///
    /// The payload is cleaned of absent fields and stamped with `createdAt`
    /// and `updatedAt` before persistence.
    pub async fn create(
        &self,
        collection: &str,
        payload: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.put(collection, &id, payload).await
    }

    /// Create or replace a document under a caller-supplied id.
    ///
    /// Replacing keeps the original `createdAt` and bumps the version.
    pub async fn put(
        &self,
        collection: &str,
        id: &str,
        payload: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let mut data = cleaned_object(collection, payload)?;
        let now = now_millis();
        data.insert("updatedAt".to_string(), Value::from(now));

        let mut collections = self.inner.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        let (created_at, version) = match docs.get(id) {
            Some(existing) => (
                existing.data.get("createdAt").cloned(),
                existing.version + 1,
            ),
            None => (None, 1),
        };
        data.insert(
            "createdAt".to_string(),
            created_at.unwrap_or_else(|| Value::from(now)),
        );
        docs.insert(id.to_string(), StoredDocument { data: data.clone(), version });
        Ok(Document {
            id: id.to_string(),
            version,
            data,
        })
    }

    /// Shallow-merge a partial document into an existing one.
    ///
    /// The patch is cleaned of absent fields; `updatedAt` is restamped and
    /// the version bumped.
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let patch = cleaned_object(collection, patch)?;
        let mut collections = self.inner.write().await;
        let stored = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        for (key, value) in patch {
            stored.data.insert(key, value);
        }
        stored
            .data
            .insert("updatedAt".to_string(), Value::from(now_millis()));
        stored.version += 1;
        Ok(Document {
            id: id.to_string(),
            version: stored.version,
            data: stored.data.clone(),
        })
    }

    /// Delete a document. Returns whether it existed.
    pub async fn delete(&self, collection: &str, id: &str) -> bool {
        let mut collections = self.inner.write().await;
        collections
            .get_mut(collection)
            .map(|c| c.remove(id).is_some())
            .unwrap_or(false)
    }

    /// Run a query against a collection.
    ///
    /// Results are sorted by the query's sort key (document id as the
    /// tie-break, and the whole order when no key is set) so cursors stay
    /// stable across pages. The returned total counts every match, not just
    /// this page.
    pub async fn query(&self, collection: &str, query: &Query) -> Result<Page, StoreError> {
        let collections = self.inner.read().await;
        let mut matches: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, stored)| Document {
                        id: id.clone(),
                        version: stored.version,
                        data: stored.data.clone(),
                    })
                    .filter(|doc| query.matches(doc))
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        sort_documents(&mut matches, query.order_by.as_ref());
        let total = matches.len();

        let start = match &query.cursor {
            Some(cursor) => {
                let position = matches
                    .iter()
                    .position(|d| &d.id == cursor)
                    .ok_or_else(|| StoreError::UnknownCursor(cursor.clone()))?;
                position + 1
            }
            None => 0,
        };

        let remaining = matches.split_off(start.min(matches.len()));
        let page_size = query.page_size.unwrap_or(remaining.len());
        let mut documents: Vec<Document> = remaining;
        let has_more = documents.len() > page_size;
        documents.truncate(page_size);
        let next_cursor = if has_more {
            documents.last().map(|d| d.id.clone())
        } else {
            None
        };

        Ok(Page {
            documents,
            next_cursor,
            total,
        })
    }

    /// Begin a transaction against this store.
    pub fn begin(&self) -> Transaction {
        Transaction::new(self.clone())
    }
}

fn cleaned_object(
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

fn sort_documents(documents: &mut [Document], order_by: Option<&(String, SortDirection)>) {
    use crate::query::compare_values;
    use std::cmp::Ordering;

    documents.sort_by(|a, b| {
        let by_key = order_by
            .map(|(field, direction)| {
                let ordering = match (a.field(field), b.field(field)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            })
            .unwrap_or(Ordering::Equal);
        by_key.then_with(|| a.id.cmp(&b.id))
    });
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
