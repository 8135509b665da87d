use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format-neutral feed, turned into XML by an encoder in the core crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedDocument {
    pub title: String,
    /// Self link: the URL this feed is served from.
    pub link: String,
    pub created: DateTime<Utc>,
    pub entries: Vec<FeedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    /// The item's magnet URI.
    pub link: String,
    pub created: DateTime<Utc>,
}
