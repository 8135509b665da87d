use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bot user (downloader) together with the private feed they poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Stable external identity handed to us by the bot platform.
    pub account_id: i64,
    pub account_name: String,
    /// `None` only between the first insert and token assignment.
    pub feed_token: Option<String>,
    /// Last time the feed endpoint was served for this user.
    pub feed_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A fresh, not yet persisted user. Both timestamps start at `now`.
    pub fn new(account_id: i64, account_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            account_name: account_name.into(),
            feed_token: None,
            feed_checked_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Torrent metadata owned by the external metadata source. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub magnet_uri: String,
    pub downloaded_at: DateTime<Utc>,
}

/// "User obtained item at time T". Unique per (user_id, item_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub user_id: Uuid,
    pub item_id: i64,
    pub obtained_at: DateTime<Utc>,
}
