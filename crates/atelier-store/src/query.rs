//! Query filters, sorting and cursor pagination.

use serde_json::Value;
use std::cmp::Ordering;

use crate::Document;

/// A filter over one top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value.
    Eq(String, Value),
    /// Field is strictly greater than value.
    Gt(String, Value),
    /// Field is greater than or equal to value.
    Gte(String, Value),
    /// Field is strictly less than value.
    Lt(String, Value),
    /// Field is less than or equal to value.
    Lte(String, Value),
}

impl Filter {
    /// Equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    /// Greater-than filter.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    /// Greater-than-or-equal filter.
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gte(field.into(), value.into())
    }

    /// Less-than filter.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    /// Less-than-or-equal filter.
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lte(field.into(), value.into())
    }

    /// Check whether a document matches this filter.
    ///
    /// Documents missing the field never match.
    pub fn matches(&self, doc: &Document) -> bool {
        let (field, expected) = match self {
            Filter::Eq(f, v)
            | Filter::Gt(f, v)
            | Filter::Gte(f, v)
            | Filter::Lt(f, v)
            | Filter::Lte(f, v) => (f, v),
        };
        let Some(actual) = doc.field(field) else {
            return false;
        };
        match self {
            Filter::Eq(..) => actual == expected,
            Filter::Gt(..) => matches!(compare_values(actual, expected), Some(Ordering::Greater)),
            Filter::Gte(..) => matches!(
                compare_values(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Filter::Lt(..) => matches!(compare_values(actual, expected), Some(Ordering::Less)),
            Filter::Lte(..) => matches!(
                compare_values(actual, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

/// Sort direction for the single sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

/// A query over one collection.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Conjunction of filters.
    pub filters: Vec<Filter>,
    /// At most one sort key.
    pub order_by: Option<(String, SortDirection)>,
    /// Page size; `None` returns the whole result set.
    pub page_size: Option<usize>,
    /// Id of the last document of the previous page.
    pub cursor: Option<String>,
}

impl Query {
    /// An unfiltered query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the sort key.
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Set the page size.
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Resume after the given document id.
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Check whether a document passes every filter.
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }
}

/// One page of query results.
#[derive(Debug, Clone)]
pub struct Page {
    /// Documents on this page.
    pub documents: Vec<Document>,
    /// Cursor for the next page; `None` when the result set is exhausted.
    pub next_cursor: Option<String>,
    /// Total matching documents across all pages.
    pub total: usize,
}

/// Compare two JSON values for filtering and sorting.
///
/// Numbers compare numerically, strings and booleans by their natural
/// order. Mismatched or non-scalar types are incomparable.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        let Value::Object(map) = data else {
            panic!("test document must be an object")
        };
        Document {
            id: id.to_string(),
            version: 1,
            data: map,
        }
    }

    #[test]
    fn test_eq_filter() {
        let d = doc("p1", json!({"category": "pottery"}));
        assert!(Filter::eq("category", "pottery").matches(&d));
        assert!(!Filter::eq("category", "jewelry").matches(&d));
    }

    #[test]
    fn test_range_filters() {
        let d = doc("p1", json!({"price": 1500}));
        assert!(Filter::gt("price", 1000).matches(&d));
        assert!(Filter::lte("price", 1500).matches(&d));
        assert!(!Filter::lt("price", 1500).matches(&d));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let d = doc("p1", json!({"price": 1500}));
        assert!(!Filter::eq("category", "pottery").matches(&d));
        assert!(!Filter::gt("rating", 0).matches(&d));
    }

    #[test]
    fn test_query_is_conjunction() {
        let d = doc("p1", json!({"category": "pottery", "price": 1500}));
        let q = Query::new()
            .filter(Filter::eq("category", "pottery"))
            .filter(Filter::lt("price", 2000));
        assert!(q.matches(&d));

        let q = q.filter(Filter::gt("price", 2000));
        assert!(!q.matches(&d));
    }
}
