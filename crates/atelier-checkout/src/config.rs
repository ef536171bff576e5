//! Checkout configuration.

use crate::shipping::ShippingSchedule;
use atelier_commerce::money::Currency;
use atelier_commerce::orders::RetryPolicy;

/// Environment variable overriding the order-email endpoint.
const EMAIL_ENDPOINT_VAR: &str = "ATELIER_EMAIL_ENDPOINT";

const DEFAULT_EMAIL_ENDPOINT: &str = "http://localhost:5000/api/send-order-emails";

/// Configuration for a checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Where order confirmation emails are posted.
    pub email_endpoint: String,
    /// Currency the session quotes in.
    pub currency: Currency,
    /// Shipping rate schedule.
    pub shipping: ShippingSchedule,
    /// Retry budget for contended order placements.
    pub placement_retries: RetryPolicy,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            email_endpoint: DEFAULT_EMAIL_ENDPOINT.to_string(),
            currency: Currency::USD,
            shipping: ShippingSchedule::default(),
            placement_retries: RetryPolicy::default(),
        }
    }
}

impl CheckoutConfig {
    /// Defaults, with the email endpoint overridable from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var(EMAIL_ENDPOINT_VAR) {
            if !endpoint.trim().is_empty() {
                config.email_endpoint = endpoint;
            }
        }
        config
    }

    /// Set the session currency.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Set the email endpoint.
    pub fn with_email_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.email_endpoint = endpoint.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckoutConfig::default();
        assert_eq!(config.currency, Currency::USD);
        assert!(config.email_endpoint.ends_with("/api/send-order-emails"));
    }

    #[test]
    fn test_builders() {
        let config = CheckoutConfig::default()
            .with_currency(Currency::INR)
            .with_email_endpoint("https://mail.example.com/orders");
        assert_eq!(config.currency, Currency::INR);
        assert_eq!(config.email_endpoint, "https://mail.example.com/orders");
    }
}
