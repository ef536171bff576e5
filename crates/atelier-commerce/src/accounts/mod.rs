//! User accounts and addresses.

mod address;
mod repository;
mod user;

pub use address::Address;
pub use repository::{UserPatch, UserRepository, UserSeed};
pub use user::{ArtisanSettings, Preferences, User, UserRole};
