use std::sync::Arc;

use magnet_token::FeedTokenGenerator;
use magnet_types::Storage;
use tracing::info;

use crate::assembler::FeedAssembler;
use crate::clock::{Clock, SystemClock};
use crate::config::FeedConfig;
use crate::encoder::{FeedEncoder, RssEncoder};
use crate::error::Result;
use crate::tracker::AssociationTracker;
use crate::users::UserStore;

/// The three feed components wired to one store, clock and config.
///
/// Bot handlers use [`FeedService::users`] and [`FeedService::tracker`];
/// the HTTP layer only needs [`FeedService::serve`].
#[derive(Clone)]
pub struct FeedService {
    users: UserStore,
    tracker: AssociationTracker,
    assembler: FeedAssembler,
}

impl FeedService {
    pub fn new(storage: Arc<dyn Storage>, config: FeedConfig) -> Result<Self> {
        Self::with_parts(storage, config, Arc::new(RssEncoder), Arc::new(SystemClock))
    }

    pub fn with_parts(
        storage: Arc<dyn Storage>,
        config: FeedConfig,
        encoder: Arc<dyn FeedEncoder>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        // The salt is checked by the token generator first, so an empty salt
        // is an encoding error here just as it is for `magnet_token::generate`.
        let tokens = FeedTokenGenerator::new(&config.salt)?;
        config.validate()?;

        let users = UserStore::new(storage.clone(), tokens, clock.clone());
        let tracker = AssociationTracker::new(users.clone(), storage.clone(), clock.clone());
        let assembler = FeedAssembler::new(storage, encoder, clock, config);

        Ok(Self {
            users,
            tracker,
            assembler,
        })
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn tracker(&self) -> &AssociationTracker {
        &self.tracker
    }

    pub fn assembler(&self) -> &FeedAssembler {
        &self.assembler
    }

    /// Resolve a feed token and return the serialized feed.
    ///
    /// The feed-check timestamp only moves once the feed has been encoded,
    /// so a failed render never marks the feed as active.
    pub fn serve(&self, token: &str) -> Result<String> {
        let mut user = self.users.get_by_feed_token(token)?;
        let body = self.assembler.render(&user)?;
        self.users.touch_feed_checked(&mut user)?;

        info!(user_id = %user.id, bytes = body.len(), "Served feed");
        Ok(body)
    }
}
