use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use magnet_types::{Association, Item, Storage, User};
use uuid::Uuid;

/// In-process [`Storage`] with the same uniqueness and referential rules as
/// the SQLite schema. Meant for tests and embedding without a database file.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    items: HashMap<i64, Item>,
    /// Insertion order doubles as the tie-breaker for equal timestamps.
    associations: Vec<Association>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| anyhow!("Memory store lock poisoned: {}", e))
    }

    pub fn upsert_item(&self, item: &Item) -> Result<()> {
        self.state()?.items.insert(item.id, item.clone());
        Ok(())
    }

    pub fn user_count(&self) -> Result<usize> {
        Ok(self.state()?.users.len())
    }

    pub fn association_count(&self, user_id: Uuid) -> Result<usize> {
        Ok(self
            .state()?
            .associations
            .iter()
            .filter(|a| a.user_id == user_id)
            .count())
    }
}

impl Storage for MemoryStore {
    fn insert_user_if_absent(&self, user: &User) -> Result<bool> {
        let mut state = self.state()?;
        if state.users.values().any(|u| u.account_id == user.account_id) {
            return Ok(false);
        }
        if let Some(token) = &user.feed_token {
            if state.users.values().any(|u| u.feed_token.as_ref() == Some(token)) {
                return Err(anyhow!("Feed token already assigned: {}", token));
            }
        }
        state.users.insert(user.id, user.clone());
        Ok(true)
    }

    fn find_user_by_account_id(&self, account_id: i64) -> Result<Option<User>> {
        Ok(self
            .state()?
            .users
            .values()
            .find(|u| u.account_id == account_id)
            .cloned())
    }

    fn find_user_by_feed_token(&self, token: &str) -> Result<Option<User>> {
        Ok(self
            .state()?
            .users
            .values()
            .find(|u| u.feed_token.as_deref() == Some(token))
            .cloned())
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let mut state = self.state()?;
        if let Some(token) = &user.feed_token {
            let taken = state
                .users
                .values()
                .any(|u| u.id != user.id && u.feed_token.as_ref() == Some(token));
            if taken {
                return Err(anyhow!("Feed token already assigned: {}", token));
            }
        }

        let stored = state
            .users
            .get_mut(&user.id)
            .ok_or_else(|| anyhow!("User not found: {}", user.id))?;
        stored.account_name = user.account_name.clone();
        stored.feed_token = user.feed_token.clone();
        stored.feed_checked_at = user.feed_checked_at;
        stored.updated_at = user.updated_at;
        Ok(())
    }

    fn insert_association_or_ignore(&self, association: &Association) -> Result<bool> {
        let mut state = self.state()?;
        if !state.users.contains_key(&association.user_id) {
            return Err(anyhow!("User not found: {}", association.user_id));
        }
        if !state.items.contains_key(&association.item_id) {
            return Err(anyhow!("Item not found: {}", association.item_id));
        }

        let exists = state
            .associations
            .iter()
            .any(|a| a.user_id == association.user_id && a.item_id == association.item_id);
        if exists {
            return Ok(false);
        }
        state.associations.push(association.clone());
        Ok(true)
    }

    fn recent_items_for_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<Item>> {
        let state = self.state()?;

        let mut owned: Vec<(usize, &Association)> = state
            .associations
            .iter()
            .enumerate()
            .filter(|(_, a)| a.user_id == user_id)
            .collect();
        owned.sort_by(|(ia, a), (ib, b)| b.obtained_at.cmp(&a.obtained_at).then(ib.cmp(ia)));

        owned
            .into_iter()
            .take(limit)
            .map(|(_, a)| {
                state
                    .items
                    .get(&a.item_id)
                    .cloned()
                    .ok_or_else(|| anyhow!("Item not found: {}", a.item_id))
            })
            .collect()
    }
}
