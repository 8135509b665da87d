use crate::Database;
use crate::models::{ItemRow, UserRow, format_timestamp};
use anyhow::{Result, anyhow};
use magnet_types::{Association, Item, Storage, User};
use rusqlite::Connection;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, account_id, account_name, feed_token, feed_checked_at, created_at, updated_at";

impl Storage for Database {
    // -- Users --

    fn insert_user_if_absent(&self, user: &User) -> Result<bool> {
        self.with_conn(|conn| {
            // Only the account_id conflict is benign; a feed_token clash must
            // still fail loudly.
            let inserted = conn.execute(
                "INSERT INTO users (id, account_id, account_name, feed_token, feed_checked_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(account_id) DO NOTHING",
                rusqlite::params![
                    user.id.to_string(),
                    user.account_id,
                    user.account_name,
                    user.feed_token,
                    user.feed_checked_at.map(format_timestamp),
                    format_timestamp(user.created_at),
                    format_timestamp(user.updated_at),
                ],
            )?;
            Ok(inserted == 1)
        })
    }

    fn find_user_by_account_id(&self, account_id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "account_id = ?1", account_id))
    }

    fn find_user_by_feed_token(&self, token: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "feed_token = ?1", token))
    }

    fn update_user(&self, user: &User) -> Result<()> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE users
                 SET account_name = ?2, feed_token = ?3, feed_checked_at = ?4, updated_at = ?5
                 WHERE id = ?1",
                rusqlite::params![
                    user.id.to_string(),
                    user.account_name,
                    user.feed_token,
                    user.feed_checked_at.map(format_timestamp),
                    format_timestamp(user.updated_at),
                ],
            )?;
            if updated == 0 {
                return Err(anyhow!("User not found: {}", user.id));
            }
            Ok(())
        })
    }

    // -- Associations --

    fn insert_association_or_ignore(&self, association: &Association) -> Result<bool> {
        self.with_conn(|conn| {
            // OR IGNORE only covers the (user_id, item_id) key; foreign key
            // violations still surface as errors.
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO user_items (user_id, item_id, obtained_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![
                    association.user_id.to_string(),
                    association.item_id,
                    format_timestamp(association.obtained_at),
                ],
            )?;
            Ok(inserted == 1)
        })
    }

    fn recent_items_for_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<Item>> {
        if limit == 0 {
            return Ok(vec![]);
        }
        self.with_conn(|conn| query_recent_items(conn, &user_id.to_string(), limit))
    }
}

impl Database {
    // -- Items --

    /// Insert or refresh an item. Called by the torrent metadata source;
    /// the feed core only ever reads items.
    pub fn upsert_item(&self, item: &Item) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO items (id, title, magnet_uri, downloaded_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    magnet_uri = excluded.magnet_uri,
                    downloaded_at = excluded.downloaded_at",
                rusqlite::params![
                    item.id,
                    item.title,
                    item.magnet_uri,
                    format_timestamp(item.downloaded_at),
                ],
            )?;
            Ok(())
        })
    }

    // -- Introspection --

    pub fn user_count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }

    pub fn association_count(&self, user_id: Uuid) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM user_items WHERE user_id = ?1",
                [user_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }
}

fn query_user<P: rusqlite::ToSql>(conn: &Connection, filter: &str, value: P) -> Result<Option<User>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM users WHERE {}", USER_COLUMNS, filter))?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                account_id: row.get(1)?,
                account_name: row.get(2)?,
                feed_token: row.get(3)?,
                feed_checked_at: row.get(4)?,
                created_at: row.get(5)?,
                updated_at: row.get(6)?,
            })
        })
        .optional()?;

    row.map(User::try_from).transpose()
}

fn query_recent_items(conn: &Connection, user_id: &str, limit: usize) -> Result<Vec<Item>> {
    // rowid breaks ties between equal timestamps: later insertion first.
    let mut stmt = conn.prepare(
        "SELECT i.id, i.title, i.magnet_uri, i.downloaded_at
         FROM user_items ui
         JOIN items i ON i.id = ui.item_id
         WHERE ui.user_id = ?1
         ORDER BY ui.obtained_at DESC, ui.rowid DESC
         LIMIT ?2",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![user_id, limit as i64], |row| {
            Ok(ItemRow {
                id: row.get(0)?,
                title: row.get(1)?,
                magnet_uri: row.get(2)?,
                downloaded_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter().map(Item::try_from).collect()
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
