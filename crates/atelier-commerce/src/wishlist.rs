//! Wishlists.

use crate::error::CommerceError;
use crate::ids::{ProductId, UserId, WishlistId};
use atelier_store::{to_payload, DocumentStore, Filter, Query, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Map;

const WISHLISTS: &str = "wishlists";

/// A user's saved products. One document per user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub id: WishlistId,
    pub user_id: UserId,
    pub items: Vec<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Wishlist {
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.contains(product_id)
    }
}

/// Repository for the `wishlists` collection.
#[derive(Clone)]
pub struct WishlistRepository {
    store: DocumentStore,
}

impl WishlistRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// A user's wishlist, if they have one.
    pub async fn get_for_user(&self, user_id: &UserId) -> Result<Option<Wishlist>, CommerceError> {
        let page = self
            .store
            .query(
                WISHLISTS,
                &Query::new().filter(Filter::eq("userId", user_id.as_str())),
            )
            .await?;
        match page.documents.first() {
            Some(doc) => Ok(Some(doc.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Add a product, creating the wishlist on first use. Idempotent.
    pub async fn add(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Wishlist, CommerceError> {
        match self.get_for_user(user_id).await? {
            Some(wishlist) => {
                if wishlist.contains(product_id) {
                    return Ok(wishlist);
                }
                let mut items = wishlist.items.clone();
                items.push(product_id.clone());
                self.write_items(&wishlist.id, items).await
            }
            None => {
                let wishlist = Wishlist {
                    id: WishlistId::generate(),
                    user_id: user_id.clone(),
                    items: vec![product_id.clone()],
                    created_at: None,
                    updated_at: None,
                };
                let payload = to_payload(&wishlist)?;
                let doc = self.store.create(WISHLISTS, payload).await?;
                Ok(doc.deserialize()?)
            }
        }
    }

    /// Remove a product. A missing wishlist or product is a no-op.
    pub async fn remove(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Option<Wishlist>, CommerceError> {
        match self.get_for_user(user_id).await? {
            Some(wishlist) => {
                let items: Vec<ProductId> = wishlist
                    .items
                    .iter()
                    .filter(|id| *id != product_id)
                    .cloned()
                    .collect();
                Ok(Some(self.write_items(&wishlist.id, items).await?))
            }
            None => Ok(None),
        }
    }

    async fn write_items(
        &self,
        id: &WishlistId,
        items: Vec<ProductId>,
    ) -> Result<Wishlist, CommerceError> {
        let mut patch = Map::new();
        patch.insert("items".to_string(), serde_json::to_value(&items)?);
        let doc = self.store.update(WISHLISTS, id.as_str(), patch).await?;
        Ok(doc.deserialize()?)
    }
}
