use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use fieldbook_db::{Database, Result, time};
use fieldbook_types::api::{Credentials, NewUser};
use fieldbook_types::models::User;

use crate::password;

// Bounds on inbound registration fields.
const MAX_USERNAME_LEN: usize = 50;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_PASSWORD_LEN: usize = 100;
const MAX_FULL_NAME_LEN: usize = 100;

/// User creation and authentication over the credential store.
pub struct AuthService {
    db: Arc<Database>,
}

impl AuthService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a new active user. Returns `Ok(None)` when the input is out
    /// of bounds or the username is already taken; the UNIQUE-constraint
    /// conflict from the store is the authoritative duplicate signal.
    pub fn create_user(&self, new_user: &NewUser) -> Result<Option<User>> {
        if !Self::is_valid_registration(new_user) {
            debug!(username = %new_user.username, "rejected user registration input");
            return Ok(None);
        }

        let password_hash = password::hash_password(&new_user.password);
        let created_at = time::encode(Utc::now());

        let Some(id) = self.db.insert_user(
            &new_user.username,
            &password_hash,
            &new_user.full_name,
            new_user.email.as_deref(),
            &created_at,
        )?
        else {
            debug!(username = %new_user.username, "username already taken");
            return Ok(None);
        };

        self.get_by_id(id)
    }

    /// Authenticate with username and password. Nonexistent user, inactive
    /// user, and bad password all return `Ok(None)` — the caller cannot
    /// tell which path failed. On success `last_login` is persisted and
    /// the refreshed user returned.
    pub fn authenticate(&self, credentials: &Credentials) -> Result<Option<User>> {
        let Some(row) = self.db.get_user_by_username(&credentials.username)? else {
            return Ok(None);
        };
        let user = row.into_user()?;

        if !user.is_active {
            return Ok(None);
        }

        if !password::verify_password(&credentials.password, &user.password_hash) {
            return Ok(None);
        }

        self.db
            .update_last_login(user.id, &time::encode(Utc::now()))?;
        self.get_by_id(user.id)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.db.get_user_by_id(id)? {
            Some(row) => Ok(Some(row.into_user()?)),
            None => Ok(None),
        }
    }

    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.db.get_user_by_username(username)? {
            Some(row) => Ok(Some(row.into_user()?)),
            None => Ok(None),
        }
    }

    /// Activate or deactivate an account. Returns false for an unknown id.
    pub fn set_active(&self, id: i64, is_active: bool) -> Result<bool> {
        self.db.set_user_active(id, is_active)
    }

    fn is_valid_registration(new_user: &NewUser) -> bool {
        let username_ok =
            !new_user.username.is_empty() && new_user.username.len() <= MAX_USERNAME_LEN;
        let password_ok = (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&new_user.password.len());
        let full_name_ok =
            !new_user.full_name.is_empty() && new_user.full_name.len() <= MAX_FULL_NAME_LEN;
        username_ok && password_ok && full_name_ok
    }
}
