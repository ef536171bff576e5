//! Checkout session.
//!
//! Sequences a single checkout: address selection, delivery and payment
//! choice, totals, and the place-order submission. One session produces at
//! most one order; a failed submission keeps the cart and selections so
//! the customer can correct and retry.

use std::sync::Arc;

use atelier_commerce::accounts::{Address, User, UserRepository};
use atelier_commerce::cart::{Cart, CartItem};
use atelier_commerce::error::CommerceError;
use atelier_commerce::ids::{AddressId, OrderId};
use atelier_commerce::money::Money;
use atelier_commerce::orders::{
    DeliveryMethod, OrderDraft, OrderItem, OrderPlacement, PaymentMethod,
};
use atelier_commerce::validate::Validator;
use atelier_store::DocumentStore;
use serde_json::{Map, Value};
use tracing::warn;

use crate::addresses::{AddressBook, AddressInput};
use crate::config::CheckoutConfig;
use crate::notify::{Contact, OrderEmailPayload, OrderNotifier};
use crate::shipping::OrderTotals;

/// Where a checkout stands.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutStage {
    /// No shipping address chosen yet.
    SelectingAddress,
    /// Ready to submit.
    AddressSelected,
    /// Submission in flight.
    PlacingOrder,
    /// Terminal success.
    Placed(OrderId),
    /// Submission failed; the cart is preserved for a retry.
    Failed(String),
}

impl CheckoutStage {
    /// Whether a submission may start from this stage.
    fn can_place(&self) -> bool {
        matches!(self, CheckoutStage::AddressSelected | CheckoutStage::Failed(_))
    }
}

/// A single customer checkout.
pub struct CheckoutSession {
    users: UserRepository,
    address_book: AddressBook,
    placement: OrderPlacement,
    notifier: Arc<dyn OrderNotifier>,
    config: CheckoutConfig,
    user: User,
    cart: Cart,
    selected_address: Option<AddressId>,
    delivery_method: DeliveryMethod,
    payment_method: PaymentMethod,
    stage: CheckoutStage,
}

impl CheckoutSession {
    /// Open a checkout for a signed-in user.
    ///
    /// The user's default address, when present, is pre-selected.
    pub fn new(
        store: DocumentStore,
        user: User,
        cart: Cart,
        config: CheckoutConfig,
        notifier: Arc<dyn OrderNotifier>,
    ) -> Self {
        let users = UserRepository::new(store.clone());
        let placement =
            OrderPlacement::new(store).with_policy(config.placement_retries.clone());
        let selected_address = user.default_address().map(|a| a.id.clone());
        let stage = if selected_address.is_some() {
            CheckoutStage::AddressSelected
        } else {
            CheckoutStage::SelectingAddress
        };
        Self {
            address_book: AddressBook::new(users.clone()),
            users,
            placement,
            notifier,
            config,
            user,
            cart,
            selected_address,
            delivery_method: DeliveryMethod::Standard,
            payment_method: PaymentMethod::CashOnDelivery,
            stage,
        }
    }

    pub fn stage(&self) -> &CheckoutStage {
        &self.stage
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// The currently selected shipping address.
    pub fn selected_address(&self) -> Option<&Address> {
        self.selected_address
            .as_ref()
            .and_then(|id| self.user.address(id))
    }

    /// Choose a shipping address from the user's address book.
    pub fn select_address(&mut self, id: &AddressId) -> Result<(), CommerceError> {
        self.ensure_open()?;
        if self.user.address(id).is_none() {
            return Err(CommerceError::NotFound {
                entity: "address",
                id: id.to_string(),
            });
        }
        self.selected_address = Some(id.clone());
        self.stage = CheckoutStage::AddressSelected;
        Ok(())
    }

    /// Choose the delivery speed.
    pub fn select_delivery(&mut self, method: DeliveryMethod) -> Result<(), CommerceError> {
        self.ensure_open()?;
        self.delivery_method = method;
        Ok(())
    }

    /// Choose the payment method.
    pub fn select_payment(&mut self, method: PaymentMethod) -> Result<(), CommerceError> {
        self.ensure_open()?;
        self.payment_method = method;
        Ok(())
    }

    /// Add an address and select it for this checkout.
    pub async fn add_address(&mut self, input: AddressInput) -> Result<AddressId, CommerceError> {
        self.ensure_open()?;
        let (user, address_id) = self.address_book.add(&self.user.uid, input).await?;
        self.user = user;
        self.selected_address = Some(address_id.clone());
        self.stage = CheckoutStage::AddressSelected;
        Ok(address_id)
    }

    /// Edit an address in place.
    pub async fn edit_address(
        &mut self,
        id: &AddressId,
        input: AddressInput,
    ) -> Result<(), CommerceError> {
        self.ensure_open()?;
        self.user = self.address_book.edit(&self.user.uid, id, input).await?;
        Ok(())
    }

    /// Delete an address. Deleting the selected one clears the selection.
    pub async fn delete_address(&mut self, id: &AddressId) -> Result<(), CommerceError> {
        self.ensure_open()?;
        self.user = self.address_book.delete(&self.user.uid, id).await?;
        if self.selected_address.as_ref() == Some(id) {
            self.selected_address = None;
            self.stage = CheckoutStage::SelectingAddress;
        }
        Ok(())
    }

    /// Cost breakdown for the current cart and delivery choice.
    pub fn totals(&self) -> Result<OrderTotals, CommerceError> {
        let subtotal = self.cart.subtotal(self.config.currency)?;
        OrderTotals::compute(
            subtotal,
            self.delivery_method,
            &self.config.shipping,
            Money::zero(self.config.currency),
        )
    }

    /// Submit the order.
    ///
    /// On success the confirmation email is fired best-effort, the cart is
    /// cleared and the session reaches its terminal stage. On failure the
    /// cart and selections are untouched and the stage carries a
    /// user-facing message.
    pub async fn place(&mut self) -> Result<OrderId, CommerceError> {
        if !self.stage.can_place() {
            let mut v = Validator::new();
            let message = match &self.stage {
                CheckoutStage::PlacingOrder => "an order placement is already in flight",
                CheckoutStage::Placed(_) => "this checkout has already been completed",
                _ => "no shipping address selected",
            };
            v.error("checkout", message);
            v.finish()?;
        }

        let mut v = Validator::new();
        if self.cart.is_empty() {
            v.error("cart", "is empty");
        }
        if self.selected_address.is_none() {
            v.error("shippingAddress", "no address selected");
        }
        v.finish()?;

        let Some(address_id) = self.selected_address.clone() else {
            return Err(CommerceError::NotFound {
                entity: "address",
                id: String::new(),
            });
        };
        let shipping_address = self
            .user
            .address(&address_id)
            .cloned()
            .ok_or_else(|| CommerceError::NotFound {
                entity: "address",
                id: address_id.to_string(),
            })?;

        let totals = self.totals()?;
        let items = snapshot_items(self.cart.items())?;
        let draft = OrderDraft {
            user_id: self.user.uid.clone(),
            items,
            shipping_address,
            payment_method: self.payment_method,
            shipping_method: self.delivery_method,
            shipping_cost: totals.shipping,
            tax: totals.tax,
            discount: totals.discount,
            total: totals.total,
        };

        self.stage = CheckoutStage::PlacingOrder;
        match self.placement.place(&draft).await {
            Ok(order_id) => {
                self.notify(&order_id, totals.total).await;
                self.cart.clear();
                self.stage = CheckoutStage::Placed(order_id.clone());
                Ok(order_id)
            }
            Err(error) => {
                self.stage = CheckoutStage::Failed(user_message(&error));
                Err(error)
            }
        }
    }

    /// Fire the order-confirmation email. The order is already committed,
    /// so failures log a warning and nothing else.
    async fn notify(&self, order_id: &OrderId, total: Money) {
        let customer = Contact {
            email: self.user.email.clone(),
            name: self.user.contact_name().to_string(),
        };
        let artisan = self.artisan_contact().await;
        let payload = OrderEmailPayload::assemble(
            customer,
            artisan,
            order_id.as_str(),
            self.cart.items(),
            total,
        );
        if let Err(error) = self.notifier.order_placed(&payload).await {
            warn!(order_id = %order_id, error = %error, "order confirmation email failed");
        }
    }

    /// Resolve the notified artisan from the first cart line.
    async fn artisan_contact(&self) -> Contact {
        let fallback = Contact {
            email: String::new(),
            name: "Artisan".to_string(),
        };
        let Some(first) = self.cart.items().first() else {
            return fallback;
        };
        match self.users.get(&first.artisan_id).await {
            Ok(Some(artisan)) => Contact {
                name: artisan
                    .company_name
                    .clone()
                    .unwrap_or_else(|| artisan.contact_name().to_string()),
                email: artisan.email,
            },
            _ => fallback,
        }
    }

    fn ensure_open(&self) -> Result<(), CommerceError> {
        if matches!(
            self.stage,
            CheckoutStage::PlacingOrder | CheckoutStage::Placed(_)
        ) {
            let mut v = Validator::new();
            v.error("checkout", "this checkout can no longer be modified");
            v.finish()?;
        }
        Ok(())
    }
}

/// Build order-item snapshots from the cart.
///
/// Free-text customizations are parsed as JSON objects; unparseable ones
/// are dropped with a warning rather than failing the order.
fn snapshot_items(items: &[CartItem]) -> Result<Vec<OrderItem>, CommerceError> {
    items
        .iter()
        .map(|item| {
            let customizations = item.customization.as_deref().and_then(|raw| {
                match serde_json::from_str::<Map<String, Value>>(raw) {
                    Ok(map) => Some(map),
                    Err(error) => {
                        warn!(
                            product_id = %item.product_id,
                            %error,
                            "dropping unparseable customization"
                        );
                        None
                    }
                }
            });
            Ok(OrderItem {
                product_id: item.product_id.clone(),
                product_name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total_price: item.total()?,
                image: item.image.clone(),
                customizations,
                artisan_id: item.artisan_id.clone(),
            })
        })
        .collect()
}

/// Map a placement failure to the message shown to the customer.
///
/// Out-of-stock and product-missing failures are named precisely; anything
/// else stays generic.
pub fn user_message(error: &CommerceError) -> String {
    match error {
        CommerceError::InsufficientInventory {
            product_id,
            available,
            ..
        } => format!("Not enough stock for {product_id}: only {available} left."),
        CommerceError::ProductNotFound(product_id) => {
            format!("A product in your cart is no longer available ({product_id}).")
        }
        CommerceError::Validation(errors) => format!("Please review your order: {errors}"),
        _ => "Failed to place order. Please try again.".to_string(),
    }
}
