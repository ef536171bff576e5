//! Inventory ledger.
//!
//! The invariant-preserving stock-adjustment primitive: every adjustment
//! reads the current count and writes the new one in the same transaction,
//! and stock never goes negative. Order placement enforces the same
//! invariant inline instead of calling this per item, since per-item
//! adjustments would not be atomic across a multi-product cart.

use crate::catalog::repository::PRODUCTS;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::orders::retry::RetryPolicy;
use crate::validate::Validator;
use atelier_store::DocumentStore;
use serde_json::{Map, Value};
use tracing::debug;

/// Direction of a stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustDirection {
    /// Restock.
    Add,
    /// Remove stock, e.g. damage or a manual correction.
    Subtract,
}

impl AdjustDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustDirection::Add => "add",
            AdjustDirection::Subtract => "subtract",
        }
    }
}

/// Transactional stock adjustments for single products.
#[derive(Clone)]
pub struct InventoryLedger {
    store: DocumentStore,
    policy: RetryPolicy,
}

impl InventoryLedger {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            policy: RetryPolicy::default(),
        }
    }

    /// Override the contention retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Adjust a product's stock, returning the new count.
    ///
    /// Fails with `ProductNotFound` for unknown products and
    /// `InsufficientInventory` when a subtraction would go negative; both
    /// are final. Commit contention retries within the policy's budget
    /// before surfacing `TransactionAborted`.
    pub async fn adjust(
        &self,
        product_id: &ProductId,
        quantity: i64,
        direction: AdjustDirection,
    ) -> Result<i64, CommerceError> {
        let mut v = Validator::new();
        v.require_positive("quantity", quantity);
        v.finish()?;

        let mut attempt = 0u32;
        loop {
            match self.attempt(product_id, quantity, direction).await {
                Err(e) if e.is_retryable() => {
                    attempt += 1;
                    if attempt >= self.policy.max_attempts {
                        return Err(CommerceError::TransactionAborted { attempts: attempt });
                    }
                    debug!(product_id = %product_id, attempt, "inventory adjust contended, retrying");
                    tokio::time::sleep(self.policy.backoff.delay_for_attempt(attempt - 1)).await;
                }
                other => return other,
            }
        }
    }

    async fn attempt(
        &self,
        product_id: &ProductId,
        quantity: i64,
        direction: AdjustDirection,
    ) -> Result<i64, CommerceError> {
        let mut tx = self.store.begin();
        let doc = tx
            .get(PRODUCTS, product_id.as_str())
            .await
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.clone()))?;

        let current = doc.field_i64("inventory").unwrap_or(0);
        let new = match direction {
            AdjustDirection::Add => current + quantity,
            AdjustDirection::Subtract => current - quantity,
        };
        if new < 0 {
            return Err(CommerceError::InsufficientInventory {
                product_id: product_id.clone(),
                requested: quantity,
                available: current,
            });
        }

        let mut patch = Map::new();
        patch.insert("inventory".to_string(), Value::from(new));
        tx.update(PRODUCTS, product_id.as_str(), patch);
        tx.commit().await?;
        Ok(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Product, ProductRepository};
    use crate::ids::UserId;
    use crate::money::{Currency, Money};

    async fn seeded_product(store: &DocumentStore, inventory: i64) -> Product {
        let repo = ProductRepository::new(store.clone());
        repo.create(&Product::new(
            "Vase",
            "Hand-thrown",
            Money::new(4500, Currency::USD),
            vec!["https://img.example.com/vase.jpg".to_string()],
            "pottery",
            UserId::new("artisan-1"),
            inventory,
        ))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_add_and_subtract() {
        let store = DocumentStore::new();
        let product = seeded_product(&store, 10).await;
        let ledger = InventoryLedger::new(store.clone());

        assert_eq!(
            ledger
                .adjust(&product.id, 5, AdjustDirection::Add)
                .await
                .unwrap(),
            15
        );
        assert_eq!(
            ledger
                .adjust(&product.id, 12, AdjustDirection::Subtract)
                .await
                .unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn test_subtract_below_zero_rejected() {
        let store = DocumentStore::new();
        let product = seeded_product(&store, 3).await;
        let ledger = InventoryLedger::new(store.clone());

        let err = ledger
            .adjust(&product.id, 4, AdjustDirection::Subtract)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommerceError::InsufficientInventory {
                available: 3,
                requested: 4,
                ..
            }
        ));

        // Stock untouched by the failed adjustment.
        let repo = ProductRepository::new(store);
        assert_eq!(repo.get(&product.id).await.unwrap().unwrap().inventory, 3);
    }

    #[tokio::test]
    async fn test_missing_product() {
        let store = DocumentStore::new();
        let ledger = InventoryLedger::new(store);
        let err = ledger
            .adjust(&ProductId::new("ghost"), 1, AdjustDirection::Add)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let store = DocumentStore::new();
        let product = seeded_product(&store, 3).await;
        let ledger = InventoryLedger::new(store);
        let err = ledger
            .adjust(&product.id, 0, AdjustDirection::Add)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::Validation(_)));
    }
}
