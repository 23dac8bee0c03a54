//! Database row types — these map directly to SQLite rows.
//! Distinct from fieldbook-types domain models to keep the DB layer
//! independent; `into_*` conversions decode timestamps and JSON columns.

use fieldbook_types::models::{DataCollection, Photo, User};

use crate::error::Result;
use crate::time;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl UserRow {
    pub fn into_user(self) -> Result<User> {
        Ok(User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            full_name: self.full_name,
            email: self.email,
            is_active: self.is_active,
            created_at: time::decode(&self.created_at)?,
            last_login: self.last_login.as_deref().map(time::decode).transpose()?,
        })
    }
}

pub struct PhotoRow {
    pub id: i64,
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_at: String,
    pub metadata: String,
}

impl PhotoRow {
    pub fn into_photo(self) -> Result<Photo> {
        Ok(Photo {
            id: self.id,
            filename: self.filename,
            original_filename: self.original_filename,
            file_path: self.file_path,
            file_size: self.file_size,
            mime_type: self.mime_type,
            uploaded_at: time::decode(&self.uploaded_at)?,
            metadata: serde_json::from_str(&self.metadata)?,
        })
    }
}

pub struct CollectionRow {
    pub id: i64,
    pub customer_name: String,
    pub description: String,
    pub submission_date: String,
    pub user_id: i64,
    pub photo_id: Option<i64>,
    pub location_data: Option<String>,
    pub device_info: Option<String>,
    pub is_synchronized: bool,
    pub sync_error: Option<String>,
}

impl CollectionRow {
    pub fn into_collection(self) -> Result<DataCollection> {
        Ok(DataCollection {
            id: self.id,
            customer_name: self.customer_name,
            description: self.description,
            submission_date: time::decode(&self.submission_date)?,
            user_id: self.user_id,
            photo_id: self.photo_id,
            location_data: self
                .location_data
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            device_info: self
                .device_info
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            is_synchronized: self.is_synchronized,
            sync_error: self.sync_error,
        })
    }
}

/// Aggregate counters for one user's collections, straight from SQL.
pub struct StatsRow {
    pub total: i64,
    pub today: i64,
    pub this_week: i64,
    pub this_month: i64,
    pub pending_sync: i64,
    pub last_submission: Option<String>,
}
