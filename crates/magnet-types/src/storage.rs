use anyhow::Result;
use uuid::Uuid;

use crate::models::{Association, Item, User};

/// Persistence collaborator used by the feed core.
///
/// Every write is a single conditional statement; implementations must make
/// `insert_user_if_absent` and `insert_association_or_ignore` atomic with
/// respect to their uniqueness keys (`account_id` and `(user_id, item_id)`).
pub trait Storage: Send + Sync {
    /// Inserts `user` unless a user with the same `account_id` exists.
    /// Returns `true` when a row was written.
    fn insert_user_if_absent(&self, user: &User) -> Result<bool>;

    fn find_user_by_account_id(&self, account_id: i64) -> Result<Option<User>>;

    fn find_user_by_feed_token(&self, token: &str) -> Result<Option<User>>;

    /// Writes every mutable column of an existing user. `created_at` is
    /// never touched.
    fn update_user(&self, user: &User) -> Result<()>;

    /// Returns `false` when the (user, item) pair was already recorded.
    fn insert_association_or_ignore(&self, association: &Association) -> Result<bool>;

    /// Items associated with `user_id`, newest `obtained_at` first, ties
    /// broken by later insertion first.
    fn recent_items_for_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<Item>>;
}
