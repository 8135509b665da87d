use std::sync::Arc;

use magnet_types::{Association, Item, Storage};
use tracing::debug;

use crate::clock::Clock;
use crate::error::Result;
use crate::users::UserStore;

/// Records which user obtained which item.
#[derive(Clone)]
pub struct AssociationTracker {
    users: UserStore,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl AssociationTracker {
    pub fn new(users: UserStore, storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            storage,
            clock,
        }
    }

    /// Record that `account_id` obtained `item` now.
    ///
    /// The account must already be registered. Recording the same pair again
    /// succeeds and keeps the first timestamp.
    pub fn record(&self, account_id: i64, item: &Item) -> Result<()> {
        let user = self.users.get_by_account_id(account_id)?;

        let association = Association {
            user_id: user.id,
            item_id: item.id,
            obtained_at: self.clock.now(),
        };
        let inserted = self.storage.insert_association_or_ignore(&association)?;

        if inserted {
            debug!(account_id, item_id = item.id, "Recorded download");
        } else {
            debug!(account_id, item_id = item.id, "Download already recorded");
        }
        Ok(())
    }
}
