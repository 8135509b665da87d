use std::sync::Arc;

use magnet_types::{FeedDocument, FeedEntry, Item, Storage, User};

use crate::clock::Clock;
use crate::config::FeedConfig;
use crate::encoder::FeedEncoder;
use crate::error::{FeedError, Result};
use crate::users::feed_is_active;

/// Builds a user's feed from their most recent downloads.
#[derive(Clone)]
pub struct FeedAssembler {
    storage: Arc<dyn Storage>,
    encoder: Arc<dyn FeedEncoder>,
    clock: Arc<dyn Clock>,
    config: FeedConfig,
}

impl FeedAssembler {
    pub fn new(
        storage: Arc<dyn Storage>,
        encoder: Arc<dyn FeedEncoder>,
        clock: Arc<dyn Clock>,
        config: FeedConfig,
    ) -> Self {
        Self {
            storage,
            encoder,
            clock,
            config,
        }
    }

    /// Up to `limit` items, most recently obtained first.
    pub fn recent_items(&self, user: &User, limit: usize) -> Result<Vec<Item>> {
        Ok(self.storage.recent_items_for_user(user.id, limit)?)
    }

    /// Assemble the feed document for one page of recent items.
    pub fn build(&self, user: &User) -> Result<FeedDocument> {
        let token = user
            .feed_token
            .as_deref()
            .ok_or_else(|| FeedError::Serialization(format!("user {} has no feed token", user.id)))?;

        let entries = self
            .recent_items(user, self.config.page_size)?
            .into_iter()
            .map(|item| FeedEntry {
                title: item.title,
                link: item.magnet_uri,
                created: item.downloaded_at,
            })
            .collect();

        Ok(FeedDocument {
            title: self.config.title.clone(),
            link: self.config.feed_url(token),
            created: self.clock.now(),
            entries,
        })
    }

    /// Build and serialize in one step.
    pub fn render(&self, user: &User) -> Result<String> {
        self.encoder.encode(&self.build(user)?)
    }

    pub fn content_type(&self) -> &'static str {
        self.encoder.content_type()
    }

    /// Activity check against the configured threshold.
    pub fn is_active(&self, user: &User) -> bool {
        feed_is_active(user.feed_checked_at, self.clock.now(), self.config.active_threshold)
    }
}
