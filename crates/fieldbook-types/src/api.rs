//! External-facing request and response schemas. Inbound types reject
//! unknown fields; outbound types render timestamps as ISO-8601 strings
//! and never carry credential material.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{DataCollection, Photo, User};

// -- Auth --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
            last_login: user.last_login.map(|ts| ts.to_rfc3339()),
        }
    }
}

// -- Photos --

#[derive(Debug, Clone, Serialize)]
pub struct PhotoSummary {
    pub id: i64,
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_at: String,
}

impl From<&Photo> for PhotoSummary {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id,
            filename: photo.filename.clone(),
            original_filename: photo.original_filename.clone(),
            file_path: photo.file_path.clone(),
            file_size: photo.file_size,
            mime_type: photo.mime_type.clone(),
            uploaded_at: photo.uploaded_at.to_rfc3339(),
        }
    }
}

// -- Collections --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCollection {
    pub customer_name: String,
    pub description: String,
    pub photo_id: Option<i64>,
    pub location_data: Option<Value>,
    pub device_info: Option<Value>,
}

/// The only mutation a stored collection accepts: flagging the record as
/// propagated (or not) downstream, with an optional error message.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncUpdate {
    pub is_synchronized: bool,
    pub sync_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionRecord {
    pub id: i64,
    pub customer_name: String,
    pub description: String,
    pub submission_date: String,
    pub user_id: i64,
    pub photo_id: Option<i64>,
    pub location_data: Option<Value>,
    pub device_info: Option<Value>,
    pub is_synchronized: bool,
    pub sync_error: Option<String>,
}

impl From<&DataCollection> for CollectionRecord {
    fn from(collection: &DataCollection) -> Self {
        Self {
            id: collection.id,
            customer_name: collection.customer_name.clone(),
            description: collection.description.clone(),
            submission_date: collection.submission_date.to_rfc3339(),
            user_id: collection.user_id,
            photo_id: collection.photo_id,
            location_data: collection.location_data.clone(),
            device_info: collection.device_info.clone(),
            is_synchronized: collection.is_synchronized,
            sync_error: collection.sync_error.clone(),
        }
    }
}
