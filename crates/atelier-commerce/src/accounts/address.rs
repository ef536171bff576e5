//! Postal addresses.

use crate::ids::AddressId;
use crate::validate::{Validate, ValidationErrors, Validator};
use serde::{Deserialize, Serialize};

/// A shipping address owned by a user.
///
/// `label` is the one explicitly nullable field: clearing it stores a
/// literal null rather than omitting the key, so partial updates can
/// distinguish "cleared" from "untouched". Everything else optional is
/// simply absent when unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Stable identifier (UUID), assigned at creation.
    pub id: AddressId,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    /// Whether this is the user's pre-selected checkout address.
    pub is_default: bool,
    /// Optional display label, e.g. "Home" or "Work". Always serialized.
    #[serde(default)]
    pub label: Option<String>,
    /// Contact phone for delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl Address {
    /// Create a new address with a generated id.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            id: AddressId::generate(),
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip_code: zip_code.into(),
            country: country.into(),
            is_default: false,
            label: None,
            phone_number: None,
        }
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the delivery phone number.
    pub fn with_phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    /// Format as a single line for logs and summaries.
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} {}, {}",
            self.street, self.city, self.state, self.zip_code, self.country
        )
    }
}

impl Validate for Address {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.require_non_empty("street", &self.street);
        v.require_non_empty("city", &self.city);
        v.require_non_empty("state", &self.state);
        v.require_non_empty("zipCode", &self.zip_code);
        v.require_non_empty("country", &self.country);
        v.finish()
    }
}
