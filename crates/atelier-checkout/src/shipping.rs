//! Shipping rates and order totals.

use atelier_commerce::error::CommerceError;
use atelier_commerce::money::Money;
use atelier_commerce::orders::DeliveryMethod;

/// Flat sales tax applied to the merchandise subtotal.
pub const TAX_RATE_PERCENT: f64 = 8.0;

/// Shipping rate schedule.
///
/// Standard delivery is a step function of the merchandise subtotal:
/// full rate below the reduced threshold, reduced rate below the free
/// threshold, free at or above it. Express and priority keep flat rates.
/// All amounts are cents, quoted in the cart's currency.
#[derive(Debug, Clone)]
pub struct ShippingSchedule {
    pub standard_cents: i64,
    pub reduced_cents: i64,
    /// Subtotal at which standard shipping drops to the reduced rate.
    pub reduced_threshold_cents: i64,
    /// Subtotal at which standard shipping is free.
    pub free_threshold_cents: i64,
    pub express_cents: i64,
    pub priority_cents: i64,
}

impl Default for ShippingSchedule {
    fn default() -> Self {
        Self {
            standard_cents: 599,
            reduced_cents: 299,
            reduced_threshold_cents: 5_000,
            free_threshold_cents: 10_000,
            express_cents: 1_299,
            priority_cents: 2_499,
        }
    }
}

impl ShippingSchedule {
    /// Quote shipping for a delivery method and subtotal.
    pub fn quote(&self, method: DeliveryMethod, subtotal: Money) -> Money {
        let cents = match method {
            DeliveryMethod::Standard => {
                if subtotal.amount_cents >= self.free_threshold_cents {
                    0
                } else if subtotal.amount_cents >= self.reduced_threshold_cents {
                    self.reduced_cents
                } else {
                    self.standard_cents
                }
            }
            DeliveryMethod::Express => self.express_cents,
            DeliveryMethod::Priority => self.priority_cents,
        };
        Money::new(cents, subtotal.currency)
    }
}

/// Cost breakdown for an order about to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Compute totals: `total = subtotal + shipping + tax - discount`.
    pub fn compute(
        subtotal: Money,
        method: DeliveryMethod,
        schedule: &ShippingSchedule,
        discount: Money,
    ) -> Result<Self, CommerceError> {
        let shipping = schedule.quote(method, subtotal);
        let tax = subtotal.percentage(TAX_RATE_PERCENT);
        let total = subtotal
            .try_add(&shipping)
            .and_then(|t| t.try_add(&tax))
            .and_then(|t| t.try_subtract(&discount))
            .ok_or(CommerceError::Overflow)?;
        Ok(Self {
            subtotal,
            shipping,
            tax,
            discount,
            total,
        })
    }
}
