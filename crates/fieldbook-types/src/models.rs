//! Domain models shared across the workspace. Distinct from the
//! fieldbook-db row types to keep the DB layer independent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Metadata record for an uploaded photo. The bytes themselves live on disk
/// at `file_path`; `filename` is the generated storage name, while
/// `original_filename` is untrusted client input kept for display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub metadata: Value,
}

/// A field visit record submitted by a user, optionally referencing a photo.
/// Content fields are immutable after creation; only the synchronization
/// flag and error text may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataCollection {
    pub id: i64,
    pub customer_name: String,
    pub description: String,
    pub submission_date: DateTime<Utc>,
    pub user_id: i64,
    pub photo_id: Option<i64>,
    pub location_data: Option<Value>,
    pub device_info: Option<Value>,
    pub is_synchronized: bool,
    pub sync_error: Option<String>,
}

/// Aggregate counts over one user's collection records, computed fresh per
/// request. `last_submission` is ISO-8601 UTC.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_collections: i64,
    pub collections_today: i64,
    pub collections_this_week: i64,
    pub collections_this_month: i64,
    pub pending_sync: i64,
    pub last_submission: Option<String>,
}
