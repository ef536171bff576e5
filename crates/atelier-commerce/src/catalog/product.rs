//! Product catalog types.

use crate::ids::{ProductId, UserId};
use crate::money::Money;
use crate::validate::{Validate, ValidationErrors, Validator};
use atelier_store::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A handcrafted product listed by an artisan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<Money>,
    /// Ordered image URLs; the first is the listing image.
    pub images: Vec<String>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// The owning artisan.
    pub artisan_id: UserId,
    /// Units in stock. The single most contended field: mutated only
    /// inside a transaction that read it, never by blind decrement.
    pub inventory: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
    #[serde(default)]
    pub is_customizable: bool,
    /// Recomputed from the review list, not maintained incrementally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_reviews: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Product {
    /// Create a product listing.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        images: Vec<String>,
        category: impl Into<String>,
        artisan_id: UserId,
        inventory: i64,
    ) -> Self {
        Self {
            id: ProductId::generate(),
            name: name.into(),
            description: description.into(),
            price,
            discounted_price: None,
            images,
            category: category.into(),
            subcategory: None,
            artisan_id,
            inventory,
            attributes: None,
            tags: Vec::new(),
            materials: Vec::new(),
            occasion: None,
            is_customizable: false,
            average_rating: None,
            total_reviews: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// The price a buyer pays right now.
    pub fn effective_price(&self) -> Money {
        self.discounted_price.unwrap_or(self.price)
    }

    /// Whether the requested quantity can currently be fulfilled.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        quantity > 0 && self.inventory >= quantity
    }

    /// Whether the product is sold out.
    pub fn is_out_of_stock(&self) -> bool {
        self.inventory <= 0
    }
}

impl Validate for Product {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.require_non_empty("name", &self.name);
        v.require_non_empty("description", &self.description);
        v.require_positive_amount("price", &self.price);
        if let Some(discounted) = &self.discounted_price {
            v.require_positive_amount("discountedPrice", discounted);
        }
        v.require_min_len("images", &self.images, 1);
        v.require_non_empty("category", &self.category);
        v.require_non_empty("artisanId", self.artisan_id.as_str());
        v.require_non_negative("inventory", self.inventory);
        if let Some(rating) = self.average_rating {
            if !(0.0..=5.0).contains(&rating) {
                v.error("averageRating", "must be between 0 and 5");
            }
        }
        if let Some(total) = self.total_reviews {
            v.require_non_negative("totalReviews", total);
        }
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn sample() -> Product {
        Product::new(
            "Terracotta Vase",
            "Hand-thrown terracotta vase",
            Money::new(4500, Currency::USD),
            vec!["https://img.example.com/vase.jpg".to_string()],
            "pottery",
            UserId::new("artisan-1"),
            10,
        )
    }

    #[test]
    fn test_valid_product() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_negative_price_always_fails_on_price() {
        let mut product = sample();
        product.price = Money::new(-1, Currency::USD);
        let errors = product.validate().unwrap_err();
        assert!(errors.mentions("price"));

        // Regardless of other field values.
        product.name = String::new();
        let errors = product.validate().unwrap_err();
        assert!(errors.mentions("price"));
    }

    #[test]
    fn test_negative_inventory_rejected() {
        let mut product = sample();
        product.inventory = -1;
        assert!(product.validate().unwrap_err().mentions("inventory"));
    }

    #[test]
    fn test_empty_images_rejected() {
        let mut product = sample();
        product.images.clear();
        assert!(product.validate().unwrap_err().mentions("images"));
    }

    #[test]
    fn test_effective_price_prefers_discount() {
        let mut product = sample();
        assert_eq!(product.effective_price().amount_cents, 4500);
        product.discounted_price = Some(Money::new(3900, Currency::USD));
        assert_eq!(product.effective_price().amount_cents, 3900);
    }

    #[test]
    fn test_can_fulfill() {
        let product = sample();
        assert!(product.can_fulfill(10));
        assert!(!product.can_fulfill(11));
        assert!(!product.can_fulfill(0));
    }
}
