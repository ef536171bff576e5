//! Order email notifications.
//!
//! A thin client for the transactional-email endpoint. Sending is strictly
//! best-effort: the order is already committed by the time this runs, so
//! every failure here is downgraded to a warning by the caller and never
//! rolls anything back.

use async_trait::async_trait;
use atelier_commerce::cart::CartItem;
use atelier_commerce::money::Money;
use atelier_store::Timestamp;
use serde::Serialize;
use thiserror::Error;

/// Notification failure. Never escalated into an order failure.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The endpoint answered with a non-success status.
    #[error("email endpoint returned status {0}")]
    Status(u16),

    /// The request never completed.
    #[error("email request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A party named in the confirmation emails.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Contact {
    pub email: String,
    pub name: String,
}

/// One purchased product as rendered in the emails.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductLine {
    pub name: String,
    pub image: String,
    pub price: f64,
    pub quantity: i64,
}

/// The order block of the email payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderSummary {
    pub id: String,
    pub products: Vec<ProductLine>,
    pub total: f64,
    pub date: String,
}

/// Request body for `POST /api/send-order-emails`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderEmailPayload {
    pub customer: Contact,
    pub artisan: Contact,
    pub order: OrderSummary,
}

impl OrderEmailPayload {
    /// Assemble the payload from the committed order and the cart it came
    /// from.
    pub fn assemble(
        customer: Contact,
        artisan: Contact,
        order_id: impl Into<String>,
        items: &[CartItem],
        total: Money,
    ) -> Self {
        let products = items
            .iter()
            .map(|item| ProductLine {
                name: item.name.clone(),
                image: item.image.clone().unwrap_or_default(),
                price: item.unit_price.to_decimal(),
                quantity: item.quantity,
            })
            .collect();
        let now = Timestamp::now().to_rfc3339();
        let date = now.split('T').next().unwrap_or(&now).to_string();
        Self {
            customer,
            artisan,
            order: OrderSummary {
                id: order_id.into(),
                products,
                total: total.to_decimal(),
                date,
            },
        }
    }
}

/// Dispatches order notifications.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Announce a freshly placed order.
    async fn order_placed(&self, payload: &OrderEmailPayload) -> Result<(), NotifyError>;
}

/// HTTP notifier posting to the order-email endpoint.
pub struct HttpOrderNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOrderNotifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl OrderNotifier for HttpOrderNotifier {
    async fn order_placed(&self, payload: &OrderEmailPayload) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Notifier that drops everything. For tests and offline runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl OrderNotifier for NullNotifier {
    async fn order_placed(&self, _payload: &OrderEmailPayload) -> Result<(), NotifyError> {
        Ok(())
    }
}
