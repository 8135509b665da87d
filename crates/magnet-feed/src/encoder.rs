//! Feed document encoders.

use magnet_types::FeedDocument;
use rss::{Channel, Guid, Item};

use crate::error::{FeedError, Result};

/// Turns a [`FeedDocument`] into a serialized syndication document.
pub trait FeedEncoder: Send + Sync {
    fn encode(&self, feed: &FeedDocument) -> Result<String>;

    /// Value for the HTTP `Content-Type` header.
    fn content_type(&self) -> &'static str;
}

/// RSS 2.0 encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct RssEncoder;

impl FeedEncoder for RssEncoder {
    fn encode(&self, feed: &FeedDocument) -> Result<String> {
        let items: Vec<Item> = feed
            .entries
            .iter()
            .map(|entry| {
                // Magnet URIs are stable identifiers, not web pages.
                let mut guid = Guid::default();
                guid.set_value(entry.link.clone());
                guid.set_permalink(false);

                let mut item = Item::default();
                item.set_title(entry.title.clone());
                item.set_link(entry.link.clone());
                item.set_guid(guid);
                item.set_pub_date(entry.created.to_rfc2822());
                item
            })
            .collect();

        let mut channel = Channel::default();
        channel.set_title(feed.title.clone());
        channel.set_link(feed.link.clone());
        channel.set_description(feed.title.clone());
        channel.set_pub_date(feed.created.to_rfc2822());
        channel.set_items(items);

        let bytes = channel
            .write_to(Vec::new())
            .map_err(|e| FeedError::Serialization(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| FeedError::Serialization(e.to_string()))
    }

    fn content_type(&self) -> &'static str {
        "application/rss+xml; charset=utf-8"
    }
}
