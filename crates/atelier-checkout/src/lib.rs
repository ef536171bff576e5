//! Checkout orchestration for the Atelier marketplace.
//!
//! Sequences the client side of a checkout: address book management,
//! delivery and payment selection, cost computation, the atomic
//! order-placement call, and the best-effort confirmation email fired once
//! the order has committed.
//!
//! # Example
//!
//! ```rust,ignore
//! use atelier_checkout::{CheckoutConfig, CheckoutSession, HttpOrderNotifier};
//! use std::sync::Arc;
//!
//! let config = CheckoutConfig::from_env();
//! let notifier = Arc::new(HttpOrderNotifier::new(config.email_endpoint.clone()));
//! let mut session = CheckoutSession::new(store, user, cart, config, notifier);
//!
//! session.select_address(&address_id)?;
//! let order_id = session.place().await?;
//! ```

mod addresses;
mod config;
mod notify;
mod session;
mod shipping;

pub use addresses::{AddressBook, AddressInput};
pub use config::CheckoutConfig;
pub use notify::{
    Contact, HttpOrderNotifier, NotifyError, NullNotifier, OrderEmailPayload, OrderNotifier,
    OrderSummary, ProductLine,
};
pub use session::{user_message, CheckoutSession, CheckoutStage};
pub use shipping::{OrderTotals, ShippingSchedule, TAX_RATE_PERCENT};
