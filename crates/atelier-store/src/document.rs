//! Document representation and payload cleaning.

use crate::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Field names where a stored `null` is a deliberate value.
///
/// Everywhere else a `null` stands in for an omitted field and is stripped
/// before persistence; an address label is cleared by writing `null`
/// explicitly, so it must survive the clean.
const NULLABLE_FIELDS: &[&str] = &["label"];

/// A document read from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id (the collection key, not part of `data`).
    pub id: String,
    /// Version, incremented on every committed write.
    pub version: u64,
    /// Document fields.
    pub data: Map<String, Value>,
}

impl Document {
    /// Deserialize the document into a typed entity.
    ///
    /// The document id is injected under the `id` key so entities that carry
    /// their id as a field pick it up; documents keyed by a field they
    /// already store (e.g. a user's `uid`) are unaffected.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut data = self.data.clone();
        data.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(data))?)
    }

    /// Read a single field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Read a field as an i64, accepting integral floats.
    pub fn field_i64(&self, name: &str) -> Option<i64> {
        match self.data.get(name)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            _ => None,
        }
    }
}

/// Serialize an entity into a document payload, dropping the `id` key.
///
/// The id lives in the collection key; persisting it as a field too would
/// let the two drift apart.
pub fn to_payload<T: Serialize>(entity: &T) -> Result<Map<String, Value>, StoreError> {
    let value = serde_json::to_value(entity)?;
    let mut map = match value {
        Value::Object(map) => map,
        _ => {
            return Err(StoreError::InvalidPayload {
                collection: "<entity>".to_string(),
            })
        }
    };
    map.remove("id");
    Ok(clean_map(map))
}

/// Deep-clean a payload before persistence.
///
/// Removes map entries holding `null` (the JSON stand-in for an absent
/// field) so "absent" is never persisted as a value. Keys listed in
/// `NULLABLE_FIELDS` keep their explicit nulls. Arrays are cleaned
/// element-wise; nothing is removed from arrays themselves.
pub fn clean(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(clean_map(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(clean).collect()),
        other => other,
    }
}

fn clean_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter(|(key, value)| !value.is_null() || NULLABLE_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key, clean(value)))
        .collect()
}
