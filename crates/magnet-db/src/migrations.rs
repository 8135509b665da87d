use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub const SCHEMA_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version = current_version(conn)?;

    if version < 1 {
        info!("Running migration v1 (users, items, user_items)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                account_id      INTEGER NOT NULL UNIQUE,
                account_name    TEXT NOT NULL,
                feed_token      TEXT UNIQUE,
                feed_checked_at TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            -- Written by the torrent metadata source, read-only for feeds.
            CREATE TABLE items (
                id              INTEGER PRIMARY KEY,
                title           TEXT NOT NULL,
                magnet_uri      TEXT NOT NULL,
                downloaded_at   TEXT NOT NULL
            );

            CREATE TABLE user_items (
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                item_id         INTEGER NOT NULL REFERENCES items(id),
                obtained_at     TEXT NOT NULL,
                PRIMARY KEY (user_id, item_id)
            );

            CREATE INDEX idx_user_items_recent
                ON user_items(user_id, obtained_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;
    Ok(version)
}
