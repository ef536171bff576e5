//! Order types.

use crate::accounts::Address;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use crate::validate::{Validate, ValidationErrors, Validator};
use atelier_store::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    Pending,
    /// Artisan is preparing the order.
    Processing,
    /// Order shipped.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Check if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Check whether a transition is legal: the fulfillment sequence moves
    /// one step at a time, and any non-terminal order can be cancelled.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if next == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
        )
    }
}

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// How the order is paid. Cash on delivery is the only supported method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cod",
        }
    }
}

/// Delivery speed chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// 3-5 business days.
    #[default]
    Standard,
    /// 1-2 business days.
    Express,
    /// Same-day rush, select areas.
    Priority,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Standard => "standard",
            DeliveryMethod::Express => "express",
            DeliveryMethod::Priority => "priority",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeliveryMethod::Standard => "Standard Delivery",
            DeliveryMethod::Express => "Express Delivery",
            DeliveryMethod::Priority => "Priority Delivery",
        }
    }
}

/// A snapshot of one cart line at the moment of order placement.
///
/// Name and price are copied, not referenced, so later product edits never
/// rewrite order history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customizations: Option<Map<String, Value>>,
    pub artisan_id: UserId,
}

impl Validate for OrderItem {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.require_non_empty("productId", self.product_id.as_str());
        v.require_non_empty("productName", &self.product_name);
        v.require_positive("quantity", self.quantity);
        v.require_positive_amount("unitPrice", &self.unit_price);
        v.require_positive_amount("totalPrice", &self.total_price);
        v.require_non_empty("artisanId", self.artisan_id.as_str());
        v.finish()
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Immutable at creation.
    pub items: Vec<OrderItem>,
    pub total: Money,
    pub status: OrderStatus,
    /// Copied from the user's address book at placement time.
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub shipping_method: DeliveryMethod,
    pub shipping_cost: Money,
    pub tax: Money,
    #[serde(default)]
    pub discount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Order {
    /// Total unit count across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

impl Validate for Order {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fulfillment_moves_one_step() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(OrderStatus::Pending).unwrap(),
            serde_json::json!("pending")
        );
        assert_eq!(
            serde_json::to_value(PaymentMethod::CashOnDelivery).unwrap(),
            serde_json::json!("cod")
        );
    }
}
