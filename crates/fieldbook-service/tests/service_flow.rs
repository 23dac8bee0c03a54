//! End-to-end service flows against an in-memory database and a temporary
//! upload directory.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;

use fieldbook_db::{Database, time};
use fieldbook_service::{AuthService, CollectionStore, PhotoStore};
use fieldbook_types::api::{Credentials, NewCollection, NewUser, SyncUpdate, UserProfile};

fn open_db() -> Arc<Database> {
    Arc::new(Database::open_in_memory().expect("in-memory db"))
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password: "test123".to_string(),
        full_name: "Test User".to_string(),
        email: Some("test@example.com".to_string()),
    }
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

fn new_collection(customer: &str) -> NewCollection {
    NewCollection {
        customer_name: customer.to_string(),
        description: "Customer visit".to_string(),
        photo_id: None,
        location_data: None,
        device_info: None,
    }
}

fn photo_store(db: &Arc<Database>) -> (PhotoStore, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = PhotoStore::new(db.clone(), dir.path().join("uploads"));
    (store, dir)
}

// -- Auth --

#[test]
fn create_user_assigns_identity_and_hashes_password() {
    let auth = AuthService::new(open_db());

    let user = auth
        .create_user(&new_user("testuser"))
        .unwrap()
        .expect("user created");

    assert!(user.id > 0);
    assert_eq!(user.username, "testuser");
    assert_eq!(user.full_name, "Test User");
    assert_eq!(user.email.as_deref(), Some("test@example.com"));
    assert!(user.is_active);
    assert_ne!(user.password_hash, "test123");
    assert!(user.last_login.is_none());
}

#[test]
fn duplicate_username_is_rejected_and_original_untouched() {
    let auth = AuthService::new(open_db());

    let first = auth.create_user(&new_user("testuser")).unwrap();
    assert!(first.is_some());

    let mut second = new_user("testuser");
    second.full_name = "Impostor".to_string();
    assert!(auth.create_user(&second).unwrap().is_none());

    let kept = auth
        .authenticate(&credentials("testuser", "test123"))
        .unwrap()
        .expect("original still authenticates");
    assert_eq!(kept.full_name, "Test User");
}

#[test]
fn registration_input_bounds_are_enforced() {
    let auth = AuthService::new(open_db());

    let mut short_password = new_user("bounds");
    short_password.password = "abc".to_string();
    assert!(auth.create_user(&short_password).unwrap().is_none());

    let mut empty_name = new_user("bounds");
    empty_name.full_name = String::new();
    assert!(auth.create_user(&empty_name).unwrap().is_none());

    let mut long_username = new_user(&"x".repeat(51));
    long_username.full_name = "Fine".to_string();
    assert!(auth.create_user(&long_username).unwrap().is_none());
}

#[test]
fn authenticate_updates_last_login() {
    let auth = AuthService::new(open_db());
    let created = auth.create_user(&new_user("testuser")).unwrap().unwrap();

    let before = Utc::now();
    let authenticated = auth
        .authenticate(&credentials("testuser", "test123"))
        .unwrap()
        .expect("valid credentials");

    assert_eq!(authenticated.id, created.id);
    let last_login = authenticated.last_login.expect("last_login set");
    assert!(last_login >= before - chrono::Duration::seconds(1));
}

#[test]
fn authenticate_failures_are_indistinguishable() {
    let auth = AuthService::new(open_db());
    let user = auth.create_user(&new_user("testuser")).unwrap().unwrap();

    // Wrong password.
    assert!(
        auth.authenticate(&credentials("testuser", "wrong"))
            .unwrap()
            .is_none()
    );

    // Nonexistent username.
    assert!(
        auth.authenticate(&credentials("nobody", "test123"))
            .unwrap()
            .is_none()
    );

    // Deactivated account, correct password.
    assert!(auth.set_active(user.id, false).unwrap());
    assert!(
        auth.authenticate(&credentials("testuser", "test123"))
            .unwrap()
            .is_none()
    );

    // Reactivated, it works again.
    assert!(auth.set_active(user.id, true).unwrap());
    assert!(
        auth.authenticate(&credentials("testuser", "test123"))
            .unwrap()
            .is_some()
    );
}

#[test]
fn get_by_id_round_trips() {
    let auth = AuthService::new(open_db());
    let created = auth.create_user(&new_user("testuser")).unwrap().unwrap();

    let fetched = auth.get_by_id(created.id).unwrap().expect("user exists");
    assert_eq!(fetched.username, "testuser");

    assert!(auth.get_by_id(99_999).unwrap().is_none());
}

#[test]
fn profile_projection_renders_timestamps_and_drops_credentials() {
    let auth = AuthService::new(open_db());
    let user = auth.create_user(&new_user("testuser")).unwrap().unwrap();

    let profile = UserProfile::from(&user);
    assert_eq!(profile.id, user.id);
    assert!(chrono::DateTime::parse_from_rfc3339(&profile.created_at).is_ok());

    let rendered = serde_json::to_string(&profile).unwrap();
    assert!(!rendered.contains("password"));
}

// -- Photos --

#[tokio::test]
async fn photo_save_round_trips_bytes() {
    let db = open_db();
    let (photos, _dir) = photo_store(&db);

    let bytes = b"fake image data";
    let photo = photos
        .save(bytes, "visit.jpg", "image/jpeg", None)
        .await
        .unwrap()
        .expect("photo saved");

    assert!(photo.id > 0);
    assert_eq!(photo.original_filename, "visit.jpg");
    assert_eq!(photo.mime_type, "image/jpeg");
    assert_eq!(photo.file_size, bytes.len() as i64);
    assert!(photo.filename.ends_with(".jpg"));

    let stored = std::fs::read(&photo.file_path).expect("file exists");
    assert_eq!(stored, bytes);

    let fetched = photos.get_by_id(photo.id).unwrap().expect("photo exists");
    assert_eq!(fetched.filename, photo.filename);
    assert!(photos.get_by_id(99_999).unwrap().is_none());
}

#[tokio::test]
async fn photo_save_rejects_disallowed_extension() {
    let db = open_db();
    let (photos, _dir) = photo_store(&db);

    let result = photos
        .save(b"plain text", "notes.txt", "text/plain", None)
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(!photos.upload_dir().exists());
}

#[tokio::test]
async fn photo_save_rejects_oversized_payload() {
    let db = open_db();
    let (photos, _dir) = photo_store(&db);

    let oversized = vec![0u8; fieldbook_service::photos::MAX_FILE_SIZE + 1];
    let result = photos
        .save(&oversized, "huge.jpg", "image/jpeg", None)
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(!photos.upload_dir().exists());
}

#[tokio::test]
async fn photo_save_rejects_empty_payload() {
    let db = open_db();
    let (photos, _dir) = photo_store(&db);

    let result = photos.save(b"", "empty.jpg", "image/jpeg", None).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn photo_save_removes_file_when_insert_fails() {
    let db = open_db();
    let (photos, _dir) = photo_store(&db);

    // Break the metadata table so the insert after the file write fails.
    db.with_conn(|conn| {
        conn.execute_batch("DROP TABLE photos;")?;
        Ok(())
    })
    .unwrap();

    let result = photos.save(b"fake image data", "visit.jpg", "image/jpeg", None).await;
    assert!(result.is_err());

    // The written file was cleaned up.
    let leftovers: Vec<_> = std::fs::read_dir(photos.upload_dir())
        .map(|entries| entries.collect())
        .unwrap_or_default();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn photo_metadata_blob_round_trips() {
    let db = open_db();
    let (photos, _dir) = photo_store(&db);

    let metadata = json!({"camera": "rear", "orientation": 6});
    let photo = photos
        .save(b"fake image data", "visit.jpg", "image/jpeg", Some(metadata.clone()))
        .await
        .unwrap()
        .expect("photo saved");

    assert_eq!(photo.metadata, metadata);
}

// -- Collections --

#[tokio::test]
async fn collection_create_requires_existing_references() {
    let db = open_db();
    let auth = AuthService::new(db.clone());
    let collections = CollectionStore::new(db.clone());

    // Unknown user.
    assert!(collections.create(99_999, &new_collection("Acme")).unwrap().is_none());

    let user = auth.create_user(&new_user("testuser")).unwrap().unwrap();

    // Unknown photo, existing user.
    let mut with_bad_photo = new_collection("Acme");
    with_bad_photo.photo_id = Some(99_999);
    assert!(collections.create(user.id, &with_bad_photo).unwrap().is_none());

    // Existing photo attaches.
    let (photos, _dir) = photo_store(&db);
    let photo = photos
        .save(b"fake image data", "visit.jpg", "image/jpeg", None)
        .await
        .unwrap()
        .unwrap();

    let mut with_photo = new_collection("Acme");
    with_photo.photo_id = Some(photo.id);
    let collection = collections
        .create(user.id, &with_photo)
        .unwrap()
        .expect("collection created");
    assert_eq!(collection.photo_id, Some(photo.id));
    assert_eq!(collection.user_id, user.id);
    assert!(!collection.is_synchronized);
}

#[test]
fn collection_carries_location_and_device_blobs() {
    let db = open_db();
    let auth = AuthService::new(db.clone());
    let collections = CollectionStore::new(db);
    let user = auth.create_user(&new_user("testuser")).unwrap().unwrap();

    let mut input = new_collection("Acme");
    input.location_data = Some(json!({"lat": 40.7128, "lng": -74.0060}));
    input.device_info = Some(json!({"device": "mobile"}));

    let collection = collections.create(user.id, &input).unwrap().unwrap();
    assert_eq!(collection.location_data, input.location_data);
    assert_eq!(collection.device_info, input.device_info);
    assert!(collection.sync_error.is_none());
}

#[test]
fn list_by_user_is_descending_and_bounded() {
    let db = open_db();
    let auth = AuthService::new(db.clone());
    let collections = CollectionStore::new(db);
    let user = auth.create_user(&new_user("testuser")).unwrap().unwrap();

    for i in 0..3 {
        collections
            .create(user.id, &new_collection(&format!("Customer {i}")))
            .unwrap()
            .expect("collection created");
    }

    let listed = collections.list_by_user(user.id, None).unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed[0].submission_date >= listed[1].submission_date);
    assert!(listed[1].submission_date >= listed[2].submission_date);

    let bounded = collections.list_by_user(user.id, Some(2)).unwrap();
    assert_eq!(bounded.len(), 2);
}

#[test]
fn sync_status_is_the_only_mutation() {
    let db = open_db();
    let auth = AuthService::new(db.clone());
    let collections = CollectionStore::new(db);
    let user = auth.create_user(&new_user("testuser")).unwrap().unwrap();
    let collection = collections.create(user.id, &new_collection("Acme")).unwrap().unwrap();

    let failed = SyncUpdate {
        is_synchronized: false,
        sync_error: Some("upstream timeout".to_string()),
    };
    assert!(collections.set_sync_status(collection.id, &failed).unwrap());

    let stored = collections.get_by_id(collection.id).unwrap().unwrap();
    assert!(!stored.is_synchronized);
    assert_eq!(stored.sync_error.as_deref(), Some("upstream timeout"));

    let done = SyncUpdate {
        is_synchronized: true,
        sync_error: None,
    };
    assert!(collections.set_sync_status(collection.id, &done).unwrap());

    let stored = collections.get_by_id(collection.id).unwrap().unwrap();
    assert!(stored.is_synchronized);
    assert!(stored.sync_error.is_none());

    assert!(!collections.set_sync_status(99_999, &done).unwrap());
}

#[test]
fn dashboard_stats_count_fresh_and_current_records() {
    let db = open_db();
    let auth = AuthService::new(db.clone());
    let collections = CollectionStore::new(db);
    let user = auth.create_user(&new_user("testuser")).unwrap().unwrap();

    let empty = collections.dashboard_stats(user.id).unwrap();
    assert_eq!(empty.total_collections, 0);
    assert_eq!(empty.collections_today, 0);
    assert_eq!(empty.collections_this_week, 0);
    assert_eq!(empty.collections_this_month, 0);
    assert_eq!(empty.pending_sync, 0);
    assert!(empty.last_submission.is_none());

    for i in 0..5 {
        collections
            .create(user.id, &new_collection(&format!("Customer {i}")))
            .unwrap()
            .expect("collection created");
    }

    let stats = collections.dashboard_stats(user.id).unwrap();
    assert_eq!(stats.total_collections, 5);
    assert_eq!(stats.collections_today, 5);
    assert_eq!(stats.collections_this_week, 5);
    assert_eq!(stats.collections_this_month, 5);
    assert_eq!(stats.pending_sync, 5);
    assert!(stats.last_submission.is_some());
}

#[test]
fn dashboard_windows_split_on_their_boundaries() {
    let db = open_db();
    let auth = AuthService::new(db.clone());
    let collections = CollectionStore::new(db.clone());
    let user = auth.create_user(&new_user("testuser")).unwrap().unwrap();

    // Pinned clock: Friday 2026-08-07 12:00 UTC. Day start 08-07, week
    // start Monday 08-03, month start 08-01.
    let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();

    let insert_at = |ts: chrono::DateTime<Utc>| {
        db.insert_collection(
            "Acme",
            "visit",
            &time::encode(ts),
            user.id,
            None,
            None,
            None,
        )
        .expect("insert");
    };

    insert_at(Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap()); // today
    insert_at(Utc.with_ymd_and_hms(2026, 8, 6, 23, 59, 59).unwrap()); // this week, not today
    insert_at(Utc.with_ymd_and_hms(2026, 8, 2, 12, 0, 0).unwrap()); // this month, before Monday
    insert_at(Utc.with_ymd_and_hms(2026, 7, 31, 12, 0, 0).unwrap()); // previous month

    let stats = collections.stats_at(user.id, now).unwrap();
    assert_eq!(stats.total_collections, 4);
    assert_eq!(stats.collections_today, 1);
    assert_eq!(stats.collections_this_week, 2);
    assert_eq!(stats.collections_this_month, 3);
    assert_eq!(stats.pending_sync, 4);

    let last = stats.last_submission.expect("has submissions");
    assert_eq!(
        time::decode(&last).unwrap(),
        Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap()
    );
}

// -- Seeding --

#[test]
fn seeding_demo_users_is_idempotent() {
    let db = open_db();
    let auth = AuthService::new(db);

    assert_eq!(fieldbook_service::seed::seed_demo_users(&auth).unwrap(), 3);
    assert_eq!(fieldbook_service::seed::seed_demo_users(&auth).unwrap(), 0);

    let demo = auth
        .authenticate(&credentials("demo", "demo123"))
        .unwrap()
        .expect("demo user authenticates");
    assert_eq!(demo.full_name, "Demo User");
}
