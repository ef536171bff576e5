//! Order repository.

use crate::error::CommerceError;
use crate::ids::{OrderId, UserId};
use crate::orders::{Order, OrderStatus};
use atelier_store::{DocumentStore, Filter, Query, SortDirection};
use serde_json::{Map, Value};

pub(crate) const ORDERS: &str = "orders";

/// Repository for the `orders` collection.
///
/// Orders are created only by [`crate::orders::OrderPlacement`]; this
/// repository reads them back and moves their status.
#[derive(Clone)]
pub struct OrderRepository {
    store: DocumentStore,
}

impl OrderRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch an order by id. Missing orders are `Ok(None)`.
    pub async fn get(&self, id: &OrderId) -> Result<Option<Order>, CommerceError> {
        match self.store.get(ORDERS, id.as_str()).await {
            Some(doc) => Ok(Some(doc.deserialize()?)),
            None => Ok(None),
        }
    }

    /// A customer's orders, newest first.
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, CommerceError> {
        let query = Query::new()
            .filter(Filter::eq("userId", user_id.as_str()))
            .order_by("createdAt", SortDirection::Descending);
        let page = self.store.query(ORDERS, &query).await?;
        Ok(page
            .documents
            .iter()
            .map(|doc| doc.deserialize())
            .collect::<Result<Vec<Order>, _>>()?)
    }

    /// Orders containing at least one of the artisan's products, newest
    /// first. The store cannot filter inside the items array, so membership
    /// is checked after the fetch.
    pub async fn list_for_artisan(&self, artisan_id: &UserId) -> Result<Vec<Order>, CommerceError> {
        let query = Query::new().order_by("createdAt", SortDirection::Descending);
        let page = self.store.query(ORDERS, &query).await?;
        let orders = page
            .documents
            .iter()
            .map(|doc| doc.deserialize())
            .collect::<Result<Vec<Order>, _>>()?;
        Ok(orders
            .into_iter()
            .filter(|order: &Order| order.items.iter().any(|i| &i.artisan_id == artisan_id))
            .collect())
    }

    /// Move an order's status, enforcing the transition guard.
    pub async fn update_status(
        &self,
        id: &OrderId,
        next: OrderStatus,
    ) -> Result<Order, CommerceError> {
        let order = self.get(id).await?.ok_or_else(|| CommerceError::NotFound {
            entity: "order",
            id: id.to_string(),
        })?;

        if !order.status.can_transition_to(next) {
            let mut v = crate::validate::Validator::new();
            v.error(
                "status",
                format!(
                    "cannot move from {} to {}",
                    order.status.as_str(),
                    next.as_str()
                ),
            );
            v.finish()?;
        }

        let mut patch = Map::new();
        patch.insert("status".to_string(), Value::from(next.as_str()));
        let doc = self.store.update(ORDERS, id.as_str(), patch).await?;
        Ok(doc.deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::Address;
    use crate::catalog::{Product, ProductRepository};
    use crate::ids::ProductId;
    use crate::money::{Currency, Money};
    use crate::orders::{
        DeliveryMethod, OrderDraft, OrderItem, OrderPlacement, PaymentMethod,
    };

    async fn place_order(store: &DocumentStore, user: &str, artisan: &str) -> OrderId {
        let product = ProductRepository::new(store.clone())
            .create(&Product::new(
                "Vase",
                "Hand-made",
                Money::new(10_000, Currency::USD),
                vec!["https://img.example.com/p.jpg".to_string()],
                "pottery",
                UserId::new(artisan),
                10,
            ))
            .await
            .unwrap();
        let item = OrderItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity: 1,
            unit_price: product.price,
            total_price: product.price,
            image: None,
            customizations: None,
            artisan_id: product.artisan_id.clone(),
        };
        let draft = OrderDraft {
            user_id: UserId::new(user),
            items: vec![item],
            shipping_address: Address::new("12 Kiln Lane", "Jaipur", "RJ", "302001", "India"),
            payment_method: PaymentMethod::CashOnDelivery,
            shipping_method: DeliveryMethod::Standard,
            shipping_cost: Money::new(599, Currency::USD),
            tax: Money::new(800, Currency::USD),
            discount: Money::zero(Currency::USD),
            total: Money::new(11_399, Currency::USD),
        };
        OrderPlacement::new(store.clone())
            .place(&draft)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_for_user() {
        let store = DocumentStore::new();
        place_order(&store, "u1", "a1").await;
        place_order(&store, "u1", "a2").await;
        place_order(&store, "u2", "a1").await;

        let repo = OrderRepository::new(store);
        let orders = repo.list_for_user(&UserId::new("u1")).await.unwrap();
        assert_eq!(orders.len(), 2);
    }

    #[tokio::test]
    async fn test_list_for_artisan_checks_line_items() {
        let store = DocumentStore::new();
        place_order(&store, "u1", "a1").await;
        place_order(&store, "u2", "a2").await;

        let repo = OrderRepository::new(store);
        let orders = repo.list_for_artisan(&UserId::new("a1")).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert!(orders[0].items.iter().any(|i| i.artisan_id.as_str() == "a1"));
    }

    #[tokio::test]
    async fn test_status_walks_the_lifecycle() {
        let store = DocumentStore::new();
        let id = place_order(&store, "u1", "a1").await;
        let repo = OrderRepository::new(store);

        let order = repo
            .update_status(&id, OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        repo.update_status(&id, OrderStatus::Shipped).await.unwrap();
        let order = repo
            .update_status(&id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_illegal_transition_rejected() {
        let store = DocumentStore::new();
        let id = place_order(&store, "u1", "a1").await;
        let repo = OrderRepository::new(store);

        let err = repo
            .update_status(&id, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_cancel_from_pending() {
        let store = DocumentStore::new();
        let id = place_order(&store, "u1", "a1").await;
        let repo = OrderRepository::new(store);

        let order = repo
            .update_status(&id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        // Terminal: nothing moves out of cancelled.
        assert!(repo
            .update_status(&id, OrderStatus::Processing)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_missing_order_is_not_found() {
        let store = DocumentStore::new();
        let repo = OrderRepository::new(store);
        assert!(repo.get(&OrderId::new("ghost")).await.unwrap().is_none());
        let err = repo
            .update_status(&OrderId::new("ghost"), OrderStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
    }
}
