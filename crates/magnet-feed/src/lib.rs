//! Magnet Feed: per-user download tracking and private RSS feeds.
//!
//! Users are registered from bot events and receive a stable feed token
//! derived from their account id. Downloads are recorded as user/item
//! associations, and each user's feed lists their most recent downloads.
//!
//! Everything here is synchronous and blocks on the injected
//! [`magnet_types::Storage`]. Async hosts should call in from
//! `spawn_blocking`.

pub mod assembler;
pub mod clock;
pub mod config;
pub mod encoder;
pub mod error;
pub mod service;
pub mod tracker;
pub mod users;

pub use assembler::FeedAssembler;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, FeedConfig};
pub use encoder::{FeedEncoder, RssEncoder};
pub use error::{FeedError, Result};
pub use service::FeedService;
pub use tracker::AssociationTracker;
pub use users::UserStore;
