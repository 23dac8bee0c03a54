use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            username      TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            full_name     TEXT NOT NULL,
            email         TEXT,
            is_active     INTEGER NOT NULL DEFAULT 1,
            created_at    TEXT NOT NULL,
            last_login    TEXT
        );

        CREATE TABLE IF NOT EXISTS photos (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            filename          TEXT NOT NULL,
            original_filename TEXT NOT NULL,
            file_path         TEXT NOT NULL,
            file_size         INTEGER NOT NULL CHECK (file_size > 0),
            mime_type         TEXT NOT NULL,
            uploaded_at       TEXT NOT NULL,
            metadata          TEXT NOT NULL DEFAULT '{}'
        );

        CREATE TABLE IF NOT EXISTS data_collections (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_name   TEXT NOT NULL,
            description     TEXT NOT NULL,
            submission_date TEXT NOT NULL,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            photo_id        INTEGER REFERENCES photos(id),
            location_data   TEXT,
            device_info     TEXT,
            is_synchronized INTEGER NOT NULL DEFAULT 0,
            sync_error      TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_collections_user_date
            ON data_collections(user_id, submission_date);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
