//! Product reviews and rating aggregation.

mod repository;
mod review;

pub use repository::ReviewRepository;
pub use review::{ArtisanResponse, Review};
