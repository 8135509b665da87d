//! Shared domain types for the magnet feed workspace.
//!
//! Kept free of any storage engine so the core and the database crate can
//! both depend on it.

pub mod feed;
pub mod models;
pub mod storage;

pub use feed::{FeedDocument, FeedEntry};
pub use models::{Association, Item, User};
pub use storage::Storage;
