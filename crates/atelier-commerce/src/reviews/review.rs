//! Product reviews.

use crate::ids::{ProductId, ReviewId, UserId};
use crate::validate::{Validate, ValidationErrors, Validator};
use atelier_store::Timestamp;
use serde::{Deserialize, Serialize};

/// The owning artisan's reply to a review. At most one per review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

/// A customer review of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Author display name, snapshotted for listings.
    pub user_name: String,
    /// 1 to 5 stars.
    pub rating: i64,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artisan_response: Option<ArtisanResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Review {
    /// Create a review with a generated id.
    pub fn new(
        product_id: ProductId,
        user_id: UserId,
        user_name: impl Into<String>,
        rating: i64,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id: ReviewId::generate(),
            product_id,
            user_id,
            user_name: user_name.into(),
            rating,
            comment: comment.into(),
            images: Vec::new(),
            artisan_response: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Validate for Review {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.require_non_empty("productId", self.product_id.as_str());
        v.require_non_empty("userId", self.user_id.as_str());
        v.require_non_empty("userName", &self.user_name);
        v.require_range("rating", self.rating, 1, 5);
        v.require_non_empty("comment", &self.comment);
        v.finish()
    }
}
