//! Order placement.
//!
//! The one multi-document write in the system: a single transaction that
//! re-reads every product in the cart, verifies stock for all of them, and
//! writes the order document together with every inventory decrement.
//! No partial application is ever observable: a failure on the last line
//! leaves the first line's stock untouched.

use crate::accounts::Address;
use crate::catalog::repository::PRODUCTS;
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use crate::orders::repository::ORDERS;
use crate::orders::retry::RetryPolicy;
use crate::orders::{DeliveryMethod, OrderItem, PaymentMethod};
use crate::validate::{Validate, ValidationErrors, Validator};
use atelier_store::DocumentStore;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Everything needed to write an order document.
///
/// Status fields are not part of the draft: every order is born
/// `pending`/`pending`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub shipping_method: DeliveryMethod,
    pub shipping_cost: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl OrderDraft {
    fn to_document(&self) -> Result<Map<String, Value>, CommerceError> {
        let mut payload = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        payload.insert("status".to_string(), Value::from("pending"));
        payload.insert("paymentStatus".to_string(), Value::from("pending"));
        Ok(payload)
    }
}

impl Validate for OrderDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.require_non_empty("userId", self.user_id.as_str());
        v.require_min_len("items", &self.items, 1);
        for (i, item) in self.items.iter().enumerate() {
            v.nested(&format!("items[{i}]"), item.validate());
        }
        v.require_positive_amount("total", &self.total);
        v.require_non_negative_amount("shippingCost", &self.shipping_cost);
        v.require_non_negative_amount("tax", &self.tax);
        v.require_non_negative_amount("discount", &self.discount);
        v.nested("shippingAddress", self.shipping_address.validate());
        v.finish()
    }
}

/// Executes order placement as one atomic unit against the store.
#[derive(Clone)]
pub struct OrderPlacement {
    store: DocumentStore,
    policy: RetryPolicy,
}

impl OrderPlacement {
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

    /// Place an order, returning the new order's id.
    ///
    /// Fails with exactly one of `ProductNotFound`, `InsufficientInventory`
    /// (both final) or `TransactionAborted` once commit contention has
    /// exhausted the retry budget.
    pub async fn place(&self, draft: &OrderDraft) -> Result<OrderId, CommerceError> {
        draft.validate()?;

        let mut attempt = 0u32;
        loop {
            match self.attempt(draft).await {
                Err(e) if e.is_retryable() => {
                    attempt += 1;
                    if attempt >= self.policy.max_attempts {
                        return Err(CommerceError::TransactionAborted { attempts: attempt });
                    }
                    debug!(attempt, "order placement contended, retrying");
                    tokio::time::sleep(self.policy.backoff.delay_for_attempt(attempt - 1)).await;
                }
                other => return other,
            }
        }
    }

    async fn attempt(&self, draft: &OrderDraft) -> Result<OrderId, CommerceError> {
        let mut tx = self.store.begin();

        // Read and check phases: every distinct product, in cart order,
        // before any write is staged. Duplicate lines for one product are
        // checked as a single summed requirement.
        let mut requirements: Vec<(ProductId, i64)> = Vec::new();
        for item in &draft.items {
            match requirements
                .iter_mut()
                .find(|(id, _)| id == &item.product_id)
            {
                Some((_, quantity)) => *quantity += item.quantity,
                None => requirements.push((item.product_id.clone(), item.quantity)),
            }
        }

        let mut decrements = Vec::with_capacity(requirements.len());
        for (product_id, requested) in &requirements {
            let doc = tx
                .get(PRODUCTS, product_id.as_str())
                .await
                .ok_or_else(|| CommerceError::ProductNotFound(product_id.clone()))?;
            let available = doc.field_i64("inventory").unwrap_or(0);
            if available < *requested {
                return Err(CommerceError::InsufficientInventory {
                    product_id: product_id.clone(),
                    requested: *requested,
                    available,
                });
            }
            decrements.push((product_id.clone(), available - requested));
        }

        // Write phase: the order document and every decrement commit as
        // one unit, or not at all.
        let order_id = tx.create(ORDERS, draft.to_document()?);
        for (product_id, new_inventory) in decrements {
            let mut patch = Map::new();
            patch.insert("inventory".to_string(), Value::from(new_inventory));
            tx.update(PRODUCTS, product_id.as_str(), patch);
        }
        tx.commit().await?;

        info!(
            order_id = %order_id,
            user_id = %draft.user_id,
            lines = draft.items.len(),
            "order placed"
        );
        Ok(OrderId::new(order_id))
    }
}
