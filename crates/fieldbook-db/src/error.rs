use thiserror::Error;

/// Errors produced by the store layer. Domain outcomes (unknown id,
/// validation failure) are not errors and surface as `Ok(None)` from the
/// services; these variants cover infrastructure failures only.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timestamp parse error: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("metadata encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database lock poisoned")]
    LockPoisoned,
}

/// Convenience alias used throughout the db and service crates.
pub type Result<T> = std::result::Result<T, StoreError>;
