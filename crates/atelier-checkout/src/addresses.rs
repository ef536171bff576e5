//! Address book management.
//!
//! The store has no partial-array update, so edits always
//! read-modify-write the user's whole address list and re-read the user
//! document afterwards so callers observe their own write.

use atelier_commerce::accounts::{Address, User, UserRepository};
use atelier_commerce::error::CommerceError;
use atelier_commerce::ids::{AddressId, UserId};
use atelier_commerce::validate::Validator;

/// Fields for adding or editing an address.
#[derive(Debug, Clone)]
pub struct AddressInput {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    /// `None` clears the label.
    pub label: Option<String>,
    pub phone_number: Option<String>,
}

impl AddressInput {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip_code: zip_code.into(),
            country: country.into(),
            label: None,
            phone_number: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }
}

/// Manages a user's address list.
#[derive(Clone)]
pub struct AddressBook {
    users: UserRepository,
}

impl AddressBook {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Add an address. The user's first address becomes their default.
    ///
    /// Returns the refreshed user and the new address id.
    pub async fn add(
        &self,
        uid: &UserId,
        input: AddressInput,
    ) -> Result<(User, AddressId), CommerceError> {
        let user = self.require_user(uid).await?;

        let mut address = Address::new(
            input.street,
            input.city,
            input.state,
            input.zip_code,
            input.country,
        );
        address.label = input.label;
        address.phone_number = input.phone_number;
        address.is_default = user.addresses.is_empty();
        let address_id = address.id.clone();

        let mut addresses = user.addresses;
        addresses.push(address);
        self.users.set_addresses(uid, addresses).await?;

        let user = self.require_user(uid).await?;
        Ok((user, address_id))
    }

    /// Replace an address's fields, keeping its id and default flag.
    pub async fn edit(
        &self,
        uid: &UserId,
        address_id: &AddressId,
        input: AddressInput,
    ) -> Result<User, CommerceError> {
        let user = self.require_user(uid).await?;
        let mut addresses = user.addresses;
        let address = addresses
            .iter_mut()
            .find(|a| &a.id == address_id)
            .ok_or_else(|| CommerceError::NotFound {
                entity: "address",
                id: address_id.to_string(),
            })?;

        address.street = input.street;
        address.city = input.city;
        address.state = input.state;
        address.zip_code = input.zip_code;
        address.country = input.country;
        address.label = input.label;
        address.phone_number = input.phone_number;

        self.users.set_addresses(uid, addresses).await?;
        self.require_user(uid).await
    }

    /// Delete an address. The last remaining address cannot be deleted.
    pub async fn delete(&self, uid: &UserId, address_id: &AddressId) -> Result<User, CommerceError> {
        let user = self.require_user(uid).await?;
        if user.address(address_id).is_none() {
            return Err(CommerceError::NotFound {
                entity: "address",
                id: address_id.to_string(),
            });
        }
        if user.addresses.len() == 1 {
            let mut v = Validator::new();
            v.error("addresses", "cannot delete the last remaining address");
            v.finish()?;
        }

        let addresses = user
            .addresses
            .into_iter()
            .filter(|a| &a.id != address_id)
            .collect();
        self.users.set_addresses(uid, addresses).await?;
        self.require_user(uid).await
    }

    /// Make one address the default, clearing the flag everywhere else.
    pub async fn set_default(
        &self,
        uid: &UserId,
        address_id: &AddressId,
    ) -> Result<User, CommerceError> {
        let user = self.require_user(uid).await?;
        if user.address(address_id).is_none() {
            return Err(CommerceError::NotFound {
                entity: "address",
                id: address_id.to_string(),
            });
        }

        let addresses = user
            .addresses
            .into_iter()
            .map(|mut a| {
                a.is_default = &a.id == address_id;
                a
            })
            .collect();
        self.users.set_addresses(uid, addresses).await?;
        self.require_user(uid).await
    }

    async fn require_user(&self, uid: &UserId) -> Result<User, CommerceError> {
        self.users
            .get(uid)
            .await?
            .ok_or_else(|| CommerceError::NotFound {
                entity: "user",
                id: uid.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_commerce::accounts::UserSeed;
    use atelier_store::DocumentStore;

    async fn book_with_user(uid: &str) -> (AddressBook, UserId) {
        let users = UserRepository::new(DocumentStore::new());
        let uid = UserId::new(uid);
        users
            .ensure(
                &uid,
                UserSeed {
                    display_name: Some("Asha".to_string()),
                    email: "asha@example.com".to_string(),
                    phone_number: None,
                    photo_url: None,
                },
            )
            .await
            .unwrap();
        (AddressBook::new(users), uid)
    }

    fn input(street: &str) -> AddressInput {
        AddressInput::new(street, "Jaipur", "RJ", "302001", "India")
    }

    #[tokio::test]
    async fn test_first_address_becomes_default() {
        let (book, uid) = book_with_user("u1").await;
        let (user, id) = book.add(&uid, input("1 Kiln Lane")).await.unwrap();
        assert_eq!(user.addresses.len(), 1);
        assert!(user.address(&id).unwrap().is_default);

        let (user, second) = book.add(&uid, input("2 Kiln Lane")).await.unwrap();
        assert!(!user.address(&second).unwrap().is_default);
    }

    #[tokio::test]
    async fn test_delete_last_address_rejected() {
        let (book, uid) = book_with_user("u1").await;
        let (_, id) = book.add(&uid, input("1 Kiln Lane")).await.unwrap();

        let err = book.delete(&uid, &id).await.unwrap_err();
        assert!(matches!(err, CommerceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_non_last_address() {
        let (book, uid) = book_with_user("u1").await;
        let (_, first) = book.add(&uid, input("1 Kiln Lane")).await.unwrap();
        let (_, second) = book.add(&uid, input("2 Kiln Lane")).await.unwrap();

        let user = book.delete(&uid, &second).await.unwrap();
        assert_eq!(user.addresses.len(), 1);
        assert!(user.address(&second).is_none());
        assert!(user.address(&first).is_some());
    }

    #[tokio::test]
    async fn test_set_default_is_exclusive() {
        let (book, uid) = book_with_user("u1").await;
        let (_, first) = book.add(&uid, input("1 Kiln Lane")).await.unwrap();
        let (_, second) = book.add(&uid, input("2 Kiln Lane")).await.unwrap();

        let user = book.set_default(&uid, &second).await.unwrap();
        assert!(!user.address(&first).unwrap().is_default);
        assert!(user.address(&second).unwrap().is_default);
        assert_eq!(user.addresses.iter().filter(|a| a.is_default).count(), 1);
    }

    #[tokio::test]
    async fn test_edit_keeps_id_and_default_flag() {
        let (book, uid) = book_with_user("u1").await;
        let (_, id) = book.add(&uid, input("1 Kiln Lane")).await.unwrap();

        let user = book
            .edit(&uid, &id, input("7 Pottery Row").with_label("Studio"))
            .await
            .unwrap();
        let address = user.address(&id).unwrap();
        assert_eq!(address.street, "7 Pottery Row");
        assert_eq!(address.label.as_deref(), Some("Studio"));
        assert!(address.is_default);
    }

    #[tokio::test]
    async fn test_edit_clears_label_with_none() {
        let (book, uid) = book_with_user("u1").await;
        let (_, id) = book
            .add(&uid, input("1 Kiln Lane").with_label("Home"))
            .await
            .unwrap();

        let user = book.edit(&uid, &id, input("1 Kiln Lane")).await.unwrap();
        assert_eq!(user.address(&id).unwrap().label, None);
    }

    #[tokio::test]
    async fn test_unknown_address_is_not_found() {
        let (book, uid) = book_with_user("u1").await;
        book.add(&uid, input("1 Kiln Lane")).await.unwrap();
        let err = book
            .delete(&uid, &AddressId::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_validation_failure_leaves_list_intact() {
        let (book, uid) = book_with_user("u1").await;
        let (_, id) = book.add(&uid, input("1 Kiln Lane")).await.unwrap();

        let err = book.edit(&uid, &id, input("")).await.unwrap_err();
        assert!(matches!(err, CommerceError::Validation(_)));

        let user = book.set_default(&uid, &id).await.unwrap();
        assert_eq!(user.address(&id).unwrap().street, "1 Kiln Lane");
    }
}
