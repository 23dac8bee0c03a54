use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use tracing::debug;

use fieldbook_db::{Database, Result, time};
use fieldbook_types::api::{NewCollection, SyncUpdate};
use fieldbook_types::models::{DashboardStats, DataCollection};

pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Field visit records and their read-time aggregates.
pub struct CollectionStore {
    db: Arc<Database>,
}

impl CollectionStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a visit record for a user. Returns `Ok(None)` when the user
    /// id does not resolve, or a photo id is given and does not resolve —
    /// no record is created in either case.
    pub fn create(&self, user_id: i64, input: &NewCollection) -> Result<Option<DataCollection>> {
        if self.db.get_user_by_id(user_id)?.is_none() {
            debug!(user_id, "rejected collection: unknown user");
            return Ok(None);
        }

        if let Some(photo_id) = input.photo_id {
            if self.db.get_photo_by_id(photo_id)?.is_none() {
                debug!(photo_id, "rejected collection: unknown photo");
                return Ok(None);
            }
        }

        let submission_date = time::encode(Utc::now());
        let location_data = input.location_data.as_ref().map(|v| v.to_string());
        let device_info = input.device_info.as_ref().map(|v| v.to_string());

        let id = self.db.insert_collection(
            &input.customer_name,
            &input.description,
            &submission_date,
            user_id,
            input.photo_id,
            location_data.as_deref(),
            device_info.as_deref(),
        )?;

        self.get_by_id(id)
    }

    /// Most recent first, bounded by `limit` (default 100).
    pub fn list_by_user(&self, user_id: i64, limit: Option<u32>) -> Result<Vec<DataCollection>> {
        let rows = self
            .db
            .list_collections_by_user(user_id, limit.unwrap_or(DEFAULT_LIST_LIMIT))?;
        rows.into_iter().map(|row| row.into_collection()).collect()
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<DataCollection>> {
        match self.db.get_collection_by_id(id)? {
            Some(row) => Ok(Some(row.into_collection()?)),
            None => Ok(None),
        }
    }

    /// Flag a record as propagated (or not) downstream. The only mutation
    /// a stored collection accepts; returns false for an unknown id.
    pub fn set_sync_status(&self, id: i64, update: &SyncUpdate) -> Result<bool> {
        self.db
            .set_sync_status(id, update.is_synchronized, update.sync_error.as_deref())
    }

    /// Dashboard statistics for a user, computed fresh from "now".
    pub fn dashboard_stats(&self, user_id: i64) -> Result<DashboardStats> {
        self.stats_at(user_id, Utc::now())
    }

    /// Same as [`dashboard_stats`](Self::dashboard_stats) with a pinned
    /// clock, so window arithmetic is testable.
    pub fn stats_at(&self, user_id: i64, now: DateTime<Utc>) -> Result<DashboardStats> {
        let (day_start, week_start, month_start) = period_starts(now);

        let row = self.db.collection_stats(
            user_id,
            &time::encode(day_start),
            &time::encode(week_start),
            &time::encode(month_start),
        )?;

        Ok(DashboardStats {
            total_collections: row.total,
            collections_today: row.today,
            collections_this_week: row.this_week,
            collections_this_month: row.this_month,
            pending_sync: row.pending_sync,
            last_submission: row.last_submission,
        })
    }
}

/// Midnight UTC today, the most recent Monday midnight, and the first of
/// the current month at midnight.
fn period_starts(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();

    let monday = today - chrono::Days::new(u64::from(today.weekday().num_days_from_monday()));
    // Day 1 exists in every month.
    let month_first = today.with_day(1).unwrap_or(today);

    (
        today.and_time(NaiveTime::MIN).and_utc(),
        monday.and_time(NaiveTime::MIN).and_utc(),
        month_first.and_time(NaiveTime::MIN).and_utc(),
    )
}
