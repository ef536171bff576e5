//! User repository.

use crate::accounts::{Address, ArtisanSettings, Preferences, User};
use crate::error::CommerceError;
use crate::ids::UserId;
use crate::validate::{Validate, Validator};
use atelier_store::{to_payload, DocumentStore, Filter, Query};
use serde::Serialize;
use serde_json::Value;

pub(crate) const USERS: &str = "users";

/// Seed data for first-authentication user creation.
#[derive(Debug, Clone)]
pub struct UserSeed {
    pub display_name: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    pub photo_url: Option<String>,
}

/// Partial profile update. Absent fields are untouched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artisan: Option<ArtisanSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
}

/// Repository for the `users` collection. Documents are keyed by uid.
#[derive(Clone)]
pub struct UserRepository {
    store: DocumentStore,
}

impl UserRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch a user by uid. Missing users are `Ok(None)`.
    pub async fn get(&self, uid: &UserId) -> Result<Option<User>, CommerceError> {
        match self.store.get(USERS, uid.as_str()).await {
            Some(doc) => Ok(Some(doc.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Find a user by phone number.
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, CommerceError> {
        let page = self
            .store
            .query(USERS, &Query::new().filter(Filter::eq("phoneNumber", phone)))
            .await?;
        match page.documents.first() {
            Some(doc) => Ok(Some(doc.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Create (or replace) the document for a validated user.
    pub async fn create(&self, user: &User) -> Result<User, CommerceError> {
        user.validate()?;
        let payload = to_payload(user)?;
        let doc = self.store.put(USERS, user.uid.as_str(), payload).await?;
        Ok(doc.deserialize()?)
    }

    /// Resolve the account for an authenticated principal.
    ///
    /// Matches by uid first, falls back to a phone-number lookup (accounts
    /// created before uid linking), and creates a minimal customer document
    /// when both miss.
    pub async fn ensure(&self, uid: &UserId, seed: UserSeed) -> Result<User, CommerceError> {
        if let Some(user) = self.get(uid).await? {
            return Ok(user);
        }
        if let Some(phone) = &seed.phone_number {
            if let Some(user) = self.find_by_phone(phone).await? {
                return Ok(user);
            }
        }

        let display_name = seed
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| {
                seed.phone_number
                    .as_deref()
                    .and_then(|phone| phone.get(phone.len().saturating_sub(4)..))
                    .filter(|last4| !last4.is_empty())
                    .map(|last4| format!("User {last4}"))
                    .unwrap_or_else(|| "User".to_string())
            });
        let mut user = User::new(uid.clone(), display_name, seed.email);
        user.phone_number = seed.phone_number;
        user.photo_url = seed.photo_url;
        self.create(&user).await
    }

    /// Apply a partial profile update and return the stored user.
    pub async fn update_profile(
        &self,
        uid: &UserId,
        patch: UserPatch,
    ) -> Result<User, CommerceError> {
        let mut v = Validator::new();
        if let Some(name) = &patch.display_name {
            v.require_non_empty("displayName", name);
        }
        if let Some(addresses) = &patch.addresses {
            validate_address_list(&mut v, addresses);
        }
        v.finish()?;

        let payload = match serde_json::to_value(&patch)? {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        let doc = self.store.update(USERS, uid.as_str(), payload).await?;
        Ok(doc.deserialize()?)
    }

    /// Replace the user's whole address list.
    ///
    /// Address edits always round-trip the full list; the store has no
    /// partial-array update.
    pub async fn set_addresses(
        &self,
        uid: &UserId,
        addresses: Vec<Address>,
    ) -> Result<User, CommerceError> {
        let mut v = Validator::new();
        validate_address_list(&mut v, &addresses);
        v.finish()?;

        self.update_profile(
            uid,
            UserPatch {
                addresses: Some(addresses),
                ..UserPatch::default()
            },
        )
        .await
    }
}

fn validate_address_list(v: &mut Validator, addresses: &[Address]) {
    for (i, address) in addresses.iter().enumerate() {
        v.nested(&format!("addresses[{i}]"), address.validate());
    }
    if addresses.iter().filter(|a| a.is_default).count() > 1 {
        v.error("addresses", "at most one address may be the default");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(email: &str) -> UserSeed {
        UserSeed {
            display_name: Some("Asha Karve".to_string()),
            email: email.to_string(),
            phone_number: None,
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn test_ensure_creates_minimal_customer() {
        let repo = UserRepository::new(DocumentStore::new());
        let uid = UserId::new("u1");
        let user = repo.ensure(&uid, seed("asha@example.com")).await.unwrap();
        assert_eq!(user.uid, uid);
        assert_eq!(user.role, crate::accounts::UserRole::Customer);
        assert!(user.preferences.notifications);
        assert!(user.created_at.is_some());
    }

    #[tokio::test]
    async fn test_ensure_returns_existing_by_uid() {
        let repo = UserRepository::new(DocumentStore::new());
        let uid = UserId::new("u1");
        let first = repo.ensure(&uid, seed("asha@example.com")).await.unwrap();
        let second = repo.ensure(&uid, seed("other@example.com")).await.unwrap();
        assert_eq!(second.email, first.email);
    }

    #[tokio::test]
    async fn test_ensure_falls_back_to_phone_lookup() {
        let repo = UserRepository::new(DocumentStore::new());
        let mut existing = User::new(UserId::new("legacy"), "Asha", "asha@example.com");
        existing.phone_number = Some("+15551234567".to_string());
        repo.create(&existing).await.unwrap();

        let found = repo
            .ensure(
                &UserId::new("new-uid"),
                UserSeed {
                    display_name: None,
                    email: "asha@example.com".to_string(),
                    phone_number: Some("+15551234567".to_string()),
                    photo_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(found.uid, UserId::new("legacy"));
    }

    #[tokio::test]
    async fn test_ensure_derives_display_name_from_phone() {
        let repo = UserRepository::new(DocumentStore::new());
        let user = repo
            .ensure(
                &UserId::new("u2"),
                UserSeed {
                    display_name: None,
                    email: "u2@example.com".to_string(),
                    phone_number: Some("+15559876543".to_string()),
                    photo_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(user.display_name, "User 6543");
    }

    #[tokio::test]
    async fn test_update_profile_merges() {
        let repo = UserRepository::new(DocumentStore::new());
        let uid = UserId::new("u1");
        repo.ensure(&uid, seed("asha@example.com")).await.unwrap();

        let updated = repo
            .update_profile(
                &uid,
                UserPatch {
                    bio: Some("Ceramics from Jaipur".to_string()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("Ceramics from Jaipur"));
        assert_eq!(updated.email, "asha@example.com");
    }

    #[tokio::test]
    async fn test_set_addresses_rejects_double_default() {
        let repo = UserRepository::new(DocumentStore::new());
        let uid = UserId::new("u1");
        repo.ensure(&uid, seed("asha@example.com")).await.unwrap();

        let mut a = Address::new("1 A St", "Pune", "MH", "411001", "India");
        a.is_default = true;
        let mut b = Address::new("2 B St", "Pune", "MH", "411002", "India");
        b.is_default = true;
        let err = repo.set_addresses(&uid, vec![a, b]).await.unwrap_err();
        assert!(matches!(err, CommerceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_timestamps_normalize_on_read() {
        let repo = UserRepository::new(DocumentStore::new());
        let uid = UserId::new("u1");
        let created = repo.ensure(&uid, seed("asha@example.com")).await.unwrap();
        let fetched = repo.get(&uid).await.unwrap().unwrap();
        assert_eq!(created.created_at, fetched.created_at);
    }
}
