//! Shopping cart.

use crate::error::CommerceError;
use crate::ids::{ProductId, UserId};
use crate::money::{Currency, Money};
use crate::validate::ValidationErrors;

/// Maximum quantity allowed per cart line.
pub const MAX_QUANTITY_PER_ITEM: i64 = 99;

/// One line in the cart: a snapshot of the product at add-to-cart time.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub image: Option<String>,
    /// The artisan who will fulfill this line.
    pub artisan_id: UserId,
    /// Free-text customization; parsed into structured data at order time.
    pub customization: Option<String>,
}

impl CartItem {
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
        artisan_id: UserId,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            unit_price,
            quantity,
            image: None,
            artisan_id,
            customization: None,
        }
    }

    /// Line total.
    pub fn total(&self) -> Result<Money, CommerceError> {
        self.unit_price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// A customer's cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line, merging quantity into an existing line for the same
    /// product.
    pub fn add(&mut self, item: CartItem) -> Result<(), CommerceError> {
        if item.quantity <= 0 {
            return Err(ValidationErrors::single("quantity", "must be positive").into());
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            let merged = existing.quantity.saturating_add(item.quantity);
            if merged > MAX_QUANTITY_PER_ITEM {
                return Err(quantity_cap_error().into());
            }
            existing.quantity = merged;
            return Ok(());
        }

        if item.quantity > MAX_QUANTITY_PER_ITEM {
            return Err(quantity_cap_error().into());
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove a line. Returns whether it existed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);
        self.items.len() < before
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines in cart order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Total unit count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of line totals.
    pub fn subtotal(&self, currency: Currency) -> Result<Money, CommerceError> {
        let mut total = Money::zero(currency);
        for item in &self.items {
            total = total
                .try_add(&item.total()?)
                .ok_or(CommerceError::Overflow)?;
        }
        Ok(total)
    }
}

fn quantity_cap_error() -> ValidationErrors {
    ValidationErrors::single(
        "quantity",
        format!("cannot exceed {MAX_QUANTITY_PER_ITEM} per item"),
    )
}
