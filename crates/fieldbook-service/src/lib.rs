//! Service layer for the field data collection backend: credential
//! handling, photo storage, visit records with dashboard statistics, and
//! explicit session management. A presentation layer (web or mobile
//! client) drives these services and renders what they return.

pub mod auth;
pub mod collections;
pub mod password;
pub mod photos;
pub mod seed;
pub mod session;

pub use auth::AuthService;
pub use collections::CollectionStore;
pub use photos::PhotoStore;
pub use session::SessionStore;

pub use fieldbook_db::{Database, Result, StoreError};
