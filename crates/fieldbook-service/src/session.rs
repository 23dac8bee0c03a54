//! Explicit session management.
//!
//! Sessions are opaque random tokens mapped to a snapshot of the
//! authenticated user, held in memory with a fixed time-to-live. Callers
//! pass the token back on each request; an absent or expired token simply
//! reads as "not authenticated".

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

use fieldbook_types::models::User;

const TOKEN_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Establish a session for an authenticated user and hand back the
    /// session including its token.
    pub fn login(&self, user: &User) -> Session {
        let mut token_bytes = [0u8; TOKEN_LEN];
        rand::rng().fill_bytes(&mut token_bytes);
        let token = hex::encode(token_bytes);

        let now = Utc::now();
        let session = Session {
            token: token.clone(),
            user_id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            created_at: now,
            expires_at: now + self.ttl,
        };

        self.lock().insert(token, session.clone());
        session
    }

    /// Look up a session by token. Expired entries are evicted on
    /// observation and read as `None`.
    pub fn current(&self, token: &str) -> Option<Session> {
        let mut sessions = self.lock();
        let expired = sessions
            .get(token)
            .is_some_and(|session| session.expires_at <= Utc::now());
        if expired {
            sessions.remove(token);
            return None;
        }
        sessions.get(token).cloned()
    }

    pub fn is_authenticated(&self, token: &str) -> bool {
        self.current(token).is_some()
    }

    /// Tear down a session. Unknown tokens are a no-op.
    pub fn logout(&self, token: &str) {
        self.lock().remove(token);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
