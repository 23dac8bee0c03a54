use tracing::info;

use fieldbook_db::Result;
use fieldbook_types::api::NewUser;

use crate::auth::AuthService;

const DEMO_USERS: [(&str, &str, &str, &str); 3] = [
    ("demo", "demo123", "Demo User", "demo@example.com"),
    ("fieldworker", "field123", "Field Worker", "fieldworker@example.com"),
    ("supervisor", "super123", "Field Supervisor", "supervisor@example.com"),
];

/// Create the demo accounts when absent. Idempotent; returns how many
/// users were newly created.
pub fn seed_demo_users(auth: &AuthService) -> Result<usize> {
    let mut created = 0;

    for (username, password, full_name, email) in DEMO_USERS {
        let new_user = NewUser {
            username: username.to_string(),
            password: password.to_string(),
            full_name: full_name.to_string(),
            email: Some(email.to_string()),
        };

        match auth.create_user(&new_user)? {
            Some(user) => {
                info!("Created demo user: {} ({})", user.username, user.full_name);
                created += 1;
            }
            None => info!("Demo user already exists: {username}"),
        }
    }

    Ok(created)
}
