use rusqlite::OptionalExtension;

use crate::Database;
use crate::error::Result;
use crate::models::{CollectionRow, PhotoRow, StatsRow, UserRow};

impl Database {
    // -- Users --

    /// Insert a new user. Returns `None` when the username is already
    /// taken — the UNIQUE constraint is the authoritative signal, there is
    /// no check-then-insert window.
    pub fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
        email: Option<&str>,
        created_at: &str,
    ) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, password_hash, full_name, email, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![username, password_hash, full_name, email, created_at],
            );

            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(err) if is_unique_violation(&err) => Ok(None),
                Err(err) => Err(err.into()),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, password_hash, full_name, email, is_active, created_at, last_login
                 FROM users WHERE username = ?1",
            )?;
            Ok(stmt.query_row([username], map_user_row).optional()?)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, password_hash, full_name, email, is_active, created_at, last_login
                 FROM users WHERE id = ?1",
            )?;
            Ok(stmt.query_row([id], map_user_row).optional()?)
        })
    }

    pub fn update_last_login(&self, id: i64, last_login: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET last_login = ?2 WHERE id = ?1",
                rusqlite::params![id, last_login],
            )?;
            Ok(())
        })
    }

    /// Returns false when the id is unknown.
    pub fn set_user_active(&self, id: i64, is_active: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET is_active = ?2 WHERE id = ?1",
                rusqlite::params![id, is_active],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Photos --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_photo(
        &self,
        filename: &str,
        original_filename: &str,
        file_path: &str,
        file_size: i64,
        mime_type: &str,
        uploaded_at: &str,
        metadata: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO photos (filename, original_filename, file_path, file_size, mime_type, uploaded_at, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    filename,
                    original_filename,
                    file_path,
                    file_size,
                    mime_type,
                    uploaded_at,
                    metadata
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_photo_by_id(&self, id: i64) -> Result<Option<PhotoRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, filename, original_filename, file_path, file_size, mime_type, uploaded_at, metadata
                 FROM photos WHERE id = ?1",
            )?;
            Ok(stmt.query_row([id], map_photo_row).optional()?)
        })
    }

    // -- Collections --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_collection(
        &self,
        customer_name: &str,
        description: &str,
        submission_date: &str,
        user_id: i64,
        photo_id: Option<i64>,
        location_data: Option<&str>,
        device_info: Option<&str>,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO data_collections
                     (customer_name, description, submission_date, user_id, photo_id, location_data, device_info)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    customer_name,
                    description,
                    submission_date,
                    user_id,
                    photo_id,
                    location_data,
                    device_info
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_collection_by_id(&self, id: i64) -> Result<Option<CollectionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLLECTION_COLUMNS} FROM data_collections WHERE id = ?1"
            ))?;
            Ok(stmt.query_row([id], map_collection_row).optional()?)
        })
    }

    pub fn list_collections_by_user(&self, user_id: i64, limit: u32) -> Result<Vec<CollectionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLLECTION_COLUMNS} FROM data_collections
                 WHERE user_id = ?1
                 ORDER BY submission_date DESC
                 LIMIT ?2"
            ))?;

            let rows = stmt
                .query_map(rusqlite::params![user_id, limit], map_collection_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Returns false when the id is unknown.
    pub fn set_sync_status(
        &self,
        id: i64,
        is_synchronized: bool,
        sync_error: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE data_collections SET is_synchronized = ?2, sync_error = ?3 WHERE id = ?1",
                rusqlite::params![id, is_synchronized, sync_error],
            )?;
            Ok(changed > 0)
        })
    }

    /// One-shot dashboard aggregate for a user. The window starts are
    /// pre-encoded timestamps; fixed-width encoding makes the string
    /// comparisons chronological.
    pub fn collection_stats(
        &self,
        user_id: i64,
        day_start: &str,
        week_start: &str,
        month_start: &str,
    ) -> Result<StatsRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                "SELECT COUNT(*),
                        COUNT(*) FILTER (WHERE submission_date >= ?2),
                        COUNT(*) FILTER (WHERE submission_date >= ?3),
                        COUNT(*) FILTER (WHERE submission_date >= ?4),
                        COUNT(*) FILTER (WHERE is_synchronized = 0),
                        MAX(submission_date)
                 FROM data_collections
                 WHERE user_id = ?1",
                rusqlite::params![user_id, day_start, week_start, month_start],
                |row| {
                    Ok(StatsRow {
                        total: row.get(0)?,
                        today: row.get(1)?,
                        this_week: row.get(2)?,
                        this_month: row.get(3)?,
                        pending_sync: row.get(4)?,
                        last_submission: row.get(5)?,
                    })
                },
            )?;
            Ok(row)
        })
    }
}

const COLLECTION_COLUMNS: &str = "id, customer_name, description, submission_date, user_id, \
     photo_id, location_data, device_info, is_synchronized, sync_error";

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        email: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
        last_login: row.get(7)?,
    })
}

fn map_photo_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PhotoRow> {
    Ok(PhotoRow {
        id: row.get(0)?,
        filename: row.get(1)?,
        original_filename: row.get(2)?,
        file_path: row.get(3)?,
        file_size: row.get(4)?,
        mime_type: row.get(5)?,
        uploaded_at: row.get(6)?,
        metadata: row.get(7)?,
    })
}

fn map_collection_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CollectionRow> {
    Ok(CollectionRow {
        id: row.get(0)?,
        customer_name: row.get(1)?,
        description: row.get(2)?,
        submission_date: row.get(3)?,
        user_id: row.get(4)?,
        photo_id: row.get(5)?,
        location_data: row.get(6)?,
        device_info: row.get(7)?,
        is_synchronized: row.get(8)?,
        sync_error: row.get(9)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
