#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use magnet_db::{Database, MemoryStore};
use magnet_feed::{FeedConfig, FeedService, ManualClock, RssEncoder};
use magnet_types::{Item, Storage};
use uuid::Uuid;

pub const SALT: &str = "s3cr3t";

/// Storage engines under test, plus the item/introspection helpers that are
/// not part of the core's storage interface.
pub trait TestStore: Storage + 'static {
    fn add_item(&self, item: &Item);
    fn users(&self) -> usize;
    fn associations(&self, user_id: Uuid) -> usize;
}

impl TestStore for Database {
    fn add_item(&self, item: &Item) {
        self.upsert_item(item).expect("upsert item");
    }

    fn users(&self) -> usize {
        self.user_count().expect("count users")
    }

    fn associations(&self, user_id: Uuid) -> usize {
        self.association_count(user_id).expect("count associations")
    }
}

impl TestStore for MemoryStore {
    fn add_item(&self, item: &Item) {
        self.upsert_item(item).expect("upsert item");
    }

    fn users(&self) -> usize {
        self.user_count().expect("count users")
    }

    fn associations(&self, user_id: Uuid) -> usize {
        self.association_count(user_id).expect("count associations")
    }
}

pub struct Harness<S> {
    pub store: Arc<S>,
    pub clock: Arc<ManualClock>,
    pub service: FeedService,
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn sqlite() -> Harness<Database> {
    harness(Database::open_in_memory().expect("open sqlite"), test_config())
}

pub fn memory() -> Harness<MemoryStore> {
    harness(MemoryStore::new(), test_config())
}

pub fn test_config() -> FeedConfig {
    let mut config = FeedConfig::new(SALT);
    config.feed_url_template = "https://feeds.example.org/{token}".to_string();
    config.page_size = 3;
    config
}

pub fn harness<S: TestStore>(store: S, config: FeedConfig) -> Harness<S> {
    init_tracing();

    let store = Arc::new(store);
    let clock = Arc::new(ManualClock::new(start()));
    let service = FeedService::with_parts(store.clone(), config, Arc::new(RssEncoder), clock.clone())
        .expect("valid feed service");

    Harness {
        store,
        clock,
        service,
    }
}

pub fn item(id: i64) -> Item {
    Item {
        id,
        title: format!("Movie {}", id),
        magnet_uri: format!("magnet:?xt=urn:btih:{:040x}", id),
        downloaded_at: start() - chrono::Duration::days(id),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "magnet_feed=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
