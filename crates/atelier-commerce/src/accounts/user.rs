//! User accounts.

use crate::accounts::Address;
use crate::ids::{AddressId, UserId};
use crate::validate::{Validate, ValidationErrors, Validator};
use atelier_store::Timestamp;
use serde::{Deserialize, Serialize};

/// Marketplace role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Buys handcrafted goods.
    #[default]
    Customer,
    /// Sells products and receives orders for them.
    Artisan,
    /// Marketplace operator.
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Artisan => "artisan",
            UserRole::Admin => "admin",
        }
    }
}

/// Notification and display preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub notifications: bool,
    pub email_updates: bool,
    pub theme: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications: true,
            email_updates: true,
            theme: "light".to_string(),
        }
    }
}

/// Seller-side settings, present only for artisan accounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_schedule: Option<String>,
    #[serde(default)]
    pub automatic_payout: bool,
    #[serde(default)]
    pub shipping_standard: bool,
    #[serde(default)]
    pub shipping_express: bool,
    #[serde(default)]
    pub shipping_international: bool,
    #[serde(default)]
    pub notify_new_order: bool,
    #[serde(default)]
    pub notify_order_shipped: bool,
    #[serde(default)]
    pub notify_payment_received: bool,
}

/// A marketplace user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Authentication uid; also the document id.
    pub uid: UserId,
    pub display_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<Timestamp>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artisan: Option<ArtisanSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl User {
    /// Create a minimal customer account.
    pub fn new(uid: UserId, display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid,
            display_name: display_name.into(),
            email: email.into(),
            photo_url: None,
            phone_number: None,
            role: UserRole::Customer,
            addresses: Vec::new(),
            bio: None,
            company_name: None,
            is_verified: false,
            last_login: None,
            preferences: Preferences::default(),
            artisan: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// The address pre-selected at checkout, if any.
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    /// Look up an address by id.
    pub fn address(&self, id: &AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| &a.id == id)
    }

    /// Name shown on order confirmations; falls back to the email.
    pub fn contact_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.require_non_empty("uid", self.uid.as_str());
        v.require_non_empty("displayName", &self.display_name);
        v.require_email("email", &self.email);
        for (i, address) in self.addresses.iter().enumerate() {
            v.nested(&format!("addresses[{i}]"), address.validate());
        }
        let defaults = self.addresses.iter().filter(|a| a.is_default).count();
        if defaults > 1 {
            v.error("addresses", "at most one address may be the default");
        }
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new(UserId::new("u1"), "Asha Karve", "asha@example.com")
    }

    #[test]
    fn test_minimal_user_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let user = sample();
        assert!(user.validate().is_ok());
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_invalid_email_is_reported() {
        let mut user = sample();
        user.email = "nope".to_string();
        assert!(user.validate().unwrap_err().mentions("email"));
    }

    #[test]
    fn test_multiple_defaults_rejected() {
        let mut user = sample();
        let mut a = Address::new("1 A St", "Pune", "MH", "411001", "India");
        a.is_default = true;
        let mut b = Address::new("2 B St", "Pune", "MH", "411002", "India");
        b.is_default = true;
        user.addresses = vec![a, b];
        assert!(user.validate().unwrap_err().mentions("addresses"));
    }

    #[test]
    fn test_nested_address_errors_are_prefixed() {
        let mut user = sample();
        let mut addr = Address::new("", "Pune", "MH", "411001", "India");
        addr.is_default = true;
        user.addresses = vec![addr];
        let errors = user.validate().unwrap_err();
        assert!(errors.mentions("addresses[0].street"));
    }

    #[test]
    fn test_default_address_lookup() {
        let mut user = sample();
        let mut addr = Address::new("1 A St", "Pune", "MH", "411001", "India");
        addr.is_default = true;
        let id = addr.id.clone();
        user.addresses = vec![addr];
        assert_eq!(user.default_address().map(|a| a.id.clone()), Some(id));
    }
}
