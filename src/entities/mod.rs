//! Entity module - Immutable catalog values.
//! Ratings, products and reviews are plain data; all shared state lives in
//! [`crate::core::catalog`].

pub mod product;
pub mod rating;
pub mod review;

pub use product::{Product, ProductId, ProductKind, apply_rating};
pub use rating::Rating;
pub use review::Review;
