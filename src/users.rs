//! User Store
//!
//! Owns the set of registered users and validates registration and login
//! attempts. This is a local stand-in for a backend user service: records
//! live as a JSON array under the `mock_users_db` key, secrets are stored
//! as given (a real backend must hash them), and an empty store is seeded
//! with one well-known demo account.
//!
//! # Validation
//!
//! - Username must be at least 3 characters after trimming
//! - Email must have a local@domain.tld shape
//! - Password must be at least 6 characters
//!
//! Rules are checked in that order and the first failure wins. Usernames
//! and emails are stored case-folded and are unique under case folding.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::storage::{Storage, USERS_DB_KEY};
use crate::types::UserView;

/// Username of the seeded demo account
pub const SEED_USERNAME: &str = "testuser";
/// Email of the seeded demo account
pub const SEED_EMAIL: &str = "testuser@example.com";
/// Password of the seeded demo account; a bootstrap convenience, not a
/// security feature
pub const SEED_PASSWORD: &str = "password123";

/// A registered user as persisted
///
/// The secret is kept as given. Records are append-only: there is no
/// update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Case-folded username, unique
    pub username: String,
    /// Case-folded email, unique
    pub email: String,
    /// Opaque secret, stored as given
    pub password: String,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    fn view(&self) -> UserView {
        UserView {
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// Local credential store
///
/// Mutations are serialized behind the internal mutex; validation and
/// persistence for a registration happen under one guard, so two in-process
/// registrations cannot both claim the same identifier. Writers in other
/// processes sharing the same data directory are not guarded.
#[derive(Debug)]
pub struct UserDb {
    storage: Arc<dyn Storage>,
    users: Mutex<Vec<UserRecord>>,
}

impl UserDb {
    /// Open the store, loading persisted records and seeding the demo
    /// account when none exist
    ///
    /// A corrupt persisted payload degrades to an empty (then seeded)
    /// store rather than failing.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let mut users = Self::load(storage.as_ref());
        if users.is_empty() {
            users.push(UserRecord {
                username: SEED_USERNAME.to_string(),
                email: SEED_EMAIL.to_string(),
                password: SEED_PASSWORD.to_string(),
                created_at: Utc::now(),
            });
            if let Err(err) = Self::save(storage.as_ref(), &users) {
                tracing::error!("failed to persist seeded user store: {}", err);
            }
        }

        Self {
            storage,
            users: Mutex::new(users),
        }
    }

    fn load(storage: &dyn Storage) -> Vec<UserRecord> {
        let Some(raw) = storage.get(USERS_DB_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(users) => users,
            Err(err) => {
                tracing::warn!("failed to load users from storage: {}", err);
                Vec::new()
            }
        }
    }

    fn save(storage: &dyn Storage, users: &[UserRecord]) -> Result<(), AuthError> {
        let json = serde_json::to_string(users)?;
        storage.set(USERS_DB_KEY, &json)
    }

    /// Register a new user
    ///
    /// On success the record is stored case-folded and the full store is
    /// persisted in one write.
    ///
    /// # Errors
    ///
    /// `Validation` if a field fails its rule (username, then email, then
    /// password), `Conflict` if the case-folded username or email is
    /// already registered, `Storage` if persisting fails.
    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<(), AuthError> {
        let username = username.trim();
        if username.chars().count() < 3 {
            tracing::warn!("registration rejected: username too short");
            return Err(AuthError::validation(
                "username",
                "Username must be at least 3 characters",
            ));
        }

        let email = email.trim();
        if !is_valid_email(email) {
            tracing::warn!("registration rejected: invalid email '{}'", email);
            return Err(AuthError::validation("email", "Invalid email address"));
        }

        if password.chars().count() < 6 {
            tracing::warn!("registration rejected: password too short");
            return Err(AuthError::validation(
                "password",
                "Password must be at least 6 characters",
            ));
        }

        let mut users = self.users.lock().expect("user store lock poisoned");

        if user_exists_in(&users, username, email) {
            tracing::warn!("registration rejected: '{}' already registered", username);
            return Err(AuthError::conflict("Username or email already registered"));
        }

        users.push(UserRecord {
            username: username.to_lowercase(),
            email: email.to_lowercase(),
            password: password.to_string(),
            created_at: Utc::now(),
        });

        // Memory and disk stay in step: a failed write takes the record
        // back out before the error surfaces.
        if let Err(err) = Self::save(self.storage.as_ref(), &users) {
            users.pop();
            return Err(err);
        }

        tracing::info!("registered user '{}'", username.to_lowercase());
        Ok(())
    }

    /// Validate a username/password pair
    ///
    /// Username lookup is case-insensitive; the secret must match exactly.
    pub fn validate_credentials(&self, username: &str, password: &str) -> Option<UserView> {
        let folded = username.to_lowercase();
        let users = self.users.lock().expect("user store lock poisoned");
        users
            .iter()
            .find(|u| u.username == folded && u.password == password)
            .map(UserRecord::view)
    }

    /// Whether the case-folded username OR email matches any record
    pub fn user_exists(&self, username: &str, email: &str) -> bool {
        let users = self.users.lock().expect("user store lock poisoned");
        user_exists_in(&users, username, email)
    }

    /// Look up a user by username, case-insensitively
    pub fn user_by_username(&self, username: &str) -> Option<UserView> {
        let folded = username.to_lowercase();
        let users = self.users.lock().expect("user store lock poisoned");
        users
            .iter()
            .find(|u| u.username == folded)
            .map(UserRecord::view)
    }

    /// All registered users, without secrets
    pub fn all_users(&self) -> Vec<UserView> {
        let users = self.users.lock().expect("user store lock poisoned");
        users.iter().map(UserRecord::view).collect()
    }

    /// Drop every record and the persisted key
    pub fn clear_all(&self) {
        let mut users = self.users.lock().expect("user store lock poisoned");
        users.clear();
        self.storage.remove(USERS_DB_KEY);
    }
}

fn user_exists_in(users: &[UserRecord], username: &str, email: &str) -> bool {
    let username = username.to_lowercase();
    let email = email.to_lowercase();
    users
        .iter()
        .any(|u| u.username == username || u.email == email)
}

/// Basic local@domain.tld email check
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    if local.is_empty() || domain.is_empty() {
        return false;
    }

    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
