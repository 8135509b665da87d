//! Database row types. Timestamps stay as the RFC 3339 text SQLite stores;
//! conversion into the shared models happens in one place.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use magnet_types::{Item, User};

pub struct UserRow {
    pub id: String,
    pub account_id: i64,
    pub account_name: String,
    pub feed_token: Option<String>,
    pub feed_checked_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ItemRow {
    pub id: i64,
    pub title: String,
    pub magnet_uri: String,
    pub downloaded_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row
                .id
                .parse()
                .with_context(|| format!("Corrupt user id '{}'", row.id))?,
            account_id: row.account_id,
            account_name: row.account_name,
            feed_token: row.feed_token,
            feed_checked_at: row.feed_checked_at.as_deref().map(parse_timestamp).transpose()?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

impl TryFrom<ItemRow> for Item {
    type Error = anyhow::Error;

    fn try_from(row: ItemRow) -> Result<Self> {
        Ok(Item {
            id: row.id,
            title: row.title,
            magnet_uri: row.magnet_uri,
            downloaded_at: parse_timestamp(&row.downloaded_at)?,
        })
    }
}

/// Fixed-width RFC 3339 with microseconds and a `Z` suffix, so that text
/// ordering in SQL matches chronological ordering.
pub fn format_timestamp(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone; treat it as UTC.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .with_context(|| format!("Corrupt timestamp '{}'", raw))
}
