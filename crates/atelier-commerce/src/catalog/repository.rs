//! Product repository.

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::{ProductId, UserId};
use crate::money::Money;
use crate::validate::Validate;
use atelier_store::{to_payload, DocumentStore, Filter, Query, SortDirection};
use serde::Serialize;
use serde_json::Value;

pub(crate) const PRODUCTS: &str = "products";

/// One page of catalog results.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Pass back to `list` to fetch the next page.
    pub next_cursor: Option<String>,
    /// Total matches across all pages.
    pub total: usize,
}

/// Partial product update. Absent fields are untouched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_customizable: Option<bool>,
}

/// Repository for the `products` collection.
///
/// Inventory is deliberately absent from [`ProductPatch`]: stock moves only
/// through the inventory ledger or order placement, both transactional.
#[derive(Clone)]
pub struct ProductRepository {
    store: DocumentStore,
}

impl ProductRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch a product by id. Missing products are `Ok(None)`.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, CommerceError> {
        match self.store.get(PRODUCTS, id.as_str()).await {
            Some(doc) => Ok(Some(doc.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Page through the catalog, newest first.
    pub async fn list(
        &self,
        filters: Vec<Filter>,
        page_size: usize,
        cursor: Option<String>,
    ) -> Result<ProductPage, CommerceError> {
        let mut query = Query::new()
            .order_by("createdAt", SortDirection::Descending)
            .page_size(page_size);
        for filter in filters {
            query = query.filter(filter);
        }
        if let Some(cursor) = cursor {
            query = query.after(cursor);
        }

        let page = self.store.query(PRODUCTS, &query).await?;
        let products = page
            .documents
            .iter()
            .map(|doc| doc.deserialize())
            .collect::<Result<Vec<Product>, _>>()?;
        Ok(ProductPage {
            products,
            next_cursor: page.next_cursor,
            total: page.total,
        })
    }

    /// Every product listed by one artisan, newest first.
    pub async fn list_by_artisan(
        &self,
        artisan_id: &UserId,
    ) -> Result<Vec<Product>, CommerceError> {
        let query = Query::new()
            .filter(Filter::eq("artisanId", artisan_id.as_str()))
            .order_by("createdAt", SortDirection::Descending);
        let page = self.store.query(PRODUCTS, &query).await?;
        Ok(page
            .documents
            .iter()
            .map(|doc| doc.deserialize())
            .collect::<Result<Vec<Product>, _>>()?)
    }

    /// Create a listing under a store-assigned id.
    pub async fn create(&self, product: &Product) -> Result<Product, CommerceError> {
        product.validate()?;
        let payload = to_payload(product)?;
        let doc = self.store.create(PRODUCTS, payload).await?;
        Ok(doc.deserialize()?)
    }

    /// Apply a partial update and return the stored product.
    pub async fn update(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, CommerceError> {
        let payload = match serde_json::to_value(&patch)? {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        let doc = self.store.update(PRODUCTS, id.as_str(), payload).await?;
        let product: Product = doc.deserialize()?;
        product.validate()?;
        Ok(product)
    }

    /// Remove a listing. Returns whether it existed.
    pub async fn delete(&self, id: &ProductId) -> bool {
        self.store.delete(PRODUCTS, id.as_str()).await
    }
}
