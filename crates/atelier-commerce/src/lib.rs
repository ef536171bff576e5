//! Marketplace domain types and logic for Atelier.
//!
//! This crate provides the domain layer of the handcrafted-goods
//! marketplace:
//!
//! - **Catalog**: products and their repository
//! - **Accounts**: users, addresses, profile updates
//! - **Orders**: order types, the inventory ledger and the transactional
//!   order placement
//! - **Reviews**: reviews with artisan responses and rating aggregation
//! - **Wishlist**: saved products
//!
//! Entities validate against their schemas before any write, and every
//! repository talks to an explicitly passed [`atelier_store::DocumentStore`]
//! handle so tests can substitute their own.
//!
//! # Example
//!
//! ```rust,ignore
//! use atelier_commerce::prelude::*;
//!
//! let store = DocumentStore::new();
//! let products = ProductRepository::new(store.clone());
//! let product = products.create(&listing).await?;
//!
//! let placement = OrderPlacement::new(store.clone());
//! let order_id = placement.place(&draft).await?;
//! ```

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod ids;
pub mod money;
pub mod orders;
pub mod reviews;
pub mod validate;
pub mod wishlist;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::validate::{Validate, ValidationErrors};

    pub use crate::accounts::{Address, User, UserPatch, UserRepository, UserRole, UserSeed};
    pub use crate::cart::{Cart, CartItem};
    pub use crate::catalog::{Product, ProductPage, ProductPatch, ProductRepository};
    pub use crate::orders::{
        AdjustDirection, DeliveryMethod, InventoryLedger, Order, OrderDraft, OrderItem,
        OrderPlacement, OrderRepository, OrderStatus, PaymentMethod, PaymentStatus, RetryPolicy,
    };
    pub use crate::reviews::{Review, ReviewRepository};
    pub use crate::wishlist::{Wishlist, WishlistRepository};

    pub use atelier_store::DocumentStore;
}
