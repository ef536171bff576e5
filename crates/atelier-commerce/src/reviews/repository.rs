//! Review repository and rating aggregation.

use crate::catalog::repository::PRODUCTS;
use crate::error::CommerceError;
use crate::ids::{ProductId, ReviewId};
use crate::reviews::{ArtisanResponse, Review};
use crate::validate::Validate;
use atelier_store::{to_payload, DocumentStore, Filter, Query, SortDirection, Timestamp};
use serde_json::{Map, Value};

const REVIEWS: &str = "reviews";

/// Repository for the `reviews` collection.
#[derive(Clone)]
pub struct ReviewRepository {
    store: DocumentStore,
}

impl ReviewRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Create a review under a store-assigned id.
    pub async fn create(&self, review: &Review) -> Result<Review, CommerceError> {
        review.validate()?;
        let payload = to_payload(review)?;
        let doc = self.store.create(REVIEWS, payload).await?;
        Ok(doc.deserialize()?)
    }

    /// A product's reviews, newest first.
    pub async fn list_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<Review>, CommerceError> {
        let query = Query::new()
            .filter(Filter::eq("productId", product_id.as_str()))
            .order_by("createdAt", SortDirection::Descending);
        let page = self.store.query(REVIEWS, &query).await?;
        Ok(page
            .documents
            .iter()
            .map(|doc| doc.deserialize())
            .collect::<Result<Vec<Review>, _>>()?)
    }

    /// Attach the owning artisan's reply.
    ///
    /// A reply to an already-answered review replaces the previous one, so
    /// a review never carries more than one response.
    pub async fn respond(
        &self,
        review_id: &ReviewId,
        response: impl Into<String>,
    ) -> Result<Review, CommerceError> {
        let response = ArtisanResponse {
            response: response.into(),
            created_at: Some(Timestamp::now()),
        };
        let mut patch = Map::new();
        patch.insert(
            "artisanResponse".to_string(),
            serde_json::to_value(&response)?,
        );
        let doc = self.store.update(REVIEWS, review_id.as_str(), patch).await?;
        Ok(doc.deserialize()?)
    }

    /// Recompute a product's rating aggregates from its full review list.
    ///
    /// Aggregates are recomputed rather than incrementally maintained; a
    /// product with no reviews holds zeros.
    pub async fn recompute_product_rating(
        &self,
        product_id: &ProductId,
    ) -> Result<(), CommerceError> {
        let reviews = self.list_for_product(product_id).await?;

        let (average, total) = if reviews.is_empty() {
            (0.0, 0)
        } else {
            let sum: i64 = reviews.iter().map(|r| r.rating).sum();
            let average = sum as f64 / reviews.len() as f64;
            ((average * 10.0).round() / 10.0, reviews.len() as i64)
        };

        let mut patch = Map::new();
        patch.insert("averageRating".to_string(), Value::from(average));
        patch.insert("totalReviews".to_string(), Value::from(total));
        self.store
            .update(PRODUCTS, product_id.as_str(), patch)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Product, ProductRepository};
    use crate::ids::UserId;
    use crate::money::{Currency, Money};

    async fn seeded_product(store: &DocumentStore) -> Product {
        ProductRepository::new(store.clone())
            .create(&Product::new(
                "Vase",
                "Hand-made",
                Money::new(4500, Currency::USD),
                vec!["https://img.example.com/p.jpg".to_string()],
                "pottery",
                UserId::new("artisan-1"),
                10,
            ))
            .await
            .unwrap()
    }

    fn review(product: &Product, user: &str, rating: i64) -> Review {
        Review::new(
            product.id.clone(),
            UserId::new(user),
            user,
            rating,
            "Beautiful work.",
        )
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let store = DocumentStore::new();
        let product = seeded_product(&store).await;
        let repo = ReviewRepository::new(store);

        repo.create(&review(&product, "u1", 5)).await.unwrap();
        repo.create(&review(&product, "u2", 3)).await.unwrap();

        let reviews = repo.list_for_product(&product.id).await.unwrap();
        assert_eq!(reviews.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_rating_rejected() {
        let store = DocumentStore::new();
        let product = seeded_product(&store).await;
        let repo = ReviewRepository::new(store);
        let err = repo.create(&review(&product, "u1", 6)).await.unwrap_err();
        assert!(matches!(err, CommerceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_respond_replaces_previous_response() {
        let store = DocumentStore::new();
        let product = seeded_product(&store).await;
        let repo = ReviewRepository::new(store);
        let created = repo.create(&review(&product, "u1", 4)).await.unwrap();

        repo.respond(&created.id, "Thank you!").await.unwrap();
        let updated = repo.respond(&created.id, "Glad you like it!").await.unwrap();
        let response = updated.artisan_response.unwrap();
        assert_eq!(response.response, "Glad you like it!");
    }

    #[tokio::test]
    async fn test_recompute_rating() {
        let store = DocumentStore::new();
        let product = seeded_product(&store).await;
        let repo = ReviewRepository::new(store.clone());

        repo.create(&review(&product, "u1", 5)).await.unwrap();
        repo.create(&review(&product, "u2", 4)).await.unwrap();
        repo.create(&review(&product, "u3", 4)).await.unwrap();
        repo.recompute_product_rating(&product.id).await.unwrap();

        let product = ProductRepository::new(store)
            .get(&product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.average_rating, Some(4.3));
        assert_eq!(product.total_reviews, Some(3));
    }

    #[tokio::test]
    async fn test_recompute_with_no_reviews_zeroes() {
        let store = DocumentStore::new();
        let product = seeded_product(&store).await;
        let repo = ReviewRepository::new(store.clone());
        repo.recompute_product_rating(&product.id).await.unwrap();

        let product = ProductRepository::new(store)
            .get(&product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.average_rating, Some(0.0));
        assert_eq!(product.total_reviews, Some(0));
    }
}
