use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use magnet_token::{FeedTokenGenerator, looks_like_token};
use magnet_types::{Storage, User};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{FeedError, Result};

/// Owns the user rows: registration, lookups and the feed-check timestamp.
///
/// This is the only writer of `feed_token` and `feed_checked_at`.
#[derive(Clone)]
pub struct UserStore {
    storage: Arc<dyn Storage>,
    tokens: Arc<FeedTokenGenerator>,
    clock: Arc<dyn Clock>,
}

impl UserStore {
    pub fn new(storage: Arc<dyn Storage>, tokens: FeedTokenGenerator, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            tokens: Arc::new(tokens),
            clock,
        }
    }

    /// Return the user for `account_id`, creating it on first contact.
    ///
    /// An existing user is returned as stored; `account_name` is not
    /// refreshed. Concurrent calls for the same account converge on one row
    /// and one token because the insert is conditional and the token is a
    /// pure function of the account id.
    ///
    /// A new row is written together with its token, so a failed insert
    /// (for example a token already held by another account) leaves nothing
    /// behind. Rows stored without a token get one assigned here.
    pub fn register_or_get(&self, account_id: i64, account_name: &str) -> Result<User> {
        // Validates the account id before anything is written.
        let token = self.tokens.generate(account_id)?;

        let mut candidate = User::new(account_id, account_name, self.clock.now());
        candidate.feed_token = Some(token.clone());
        if self.storage.insert_user_if_absent(&candidate)? {
            info!(account_id, user_id = %candidate.id, "Registered new user");
            return Ok(candidate);
        }

        let mut user = self.get_by_account_id(account_id)?;
        if user.feed_token.is_none() {
            user.feed_token = Some(token);
            user.updated_at = self.clock.now();
            self.storage.update_user(&user)?;
            debug!(account_id, user_id = %user.id, "Assigned feed token");
        }

        Ok(user)
    }

    pub fn get_by_account_id(&self, account_id: i64) -> Result<User> {
        self.storage
            .find_user_by_account_id(account_id)?
            .ok_or_else(|| FeedError::NotFound(format!("account {}", account_id)))
    }

    /// Public feed lookup. Malformed and unknown tokens fail identically.
    pub fn get_by_feed_token(&self, token: &str) -> Result<User> {
        if !looks_like_token(token) {
            return Err(FeedError::unknown_feed());
        }
        self.storage
            .find_user_by_feed_token(token)?
            .ok_or_else(FeedError::unknown_feed)
    }

    /// Record that the user's feed was just served.
    pub fn touch_feed_checked(&self, user: &mut User) -> Result<()> {
        let now = self.clock.now();
        user.feed_checked_at = Some(now);
        user.updated_at = now;
        self.storage.update_user(user)?;
        Ok(())
    }

    /// Whether the user polled their feed within `threshold`.
    pub fn is_feed_active(&self, user: &User, threshold: Duration) -> bool {
        feed_is_active(user.feed_checked_at, self.clock.now(), threshold)
    }
}

/// A feed never checked is inactive. There is no stored state: activity is
/// recomputed from the last check on every call.
pub fn feed_is_active(checked_at: Option<DateTime<Utc>>, now: DateTime<Utc>, threshold: Duration) -> bool {
    checked_at.is_some_and(|checked| now - checked < threshold)
}
