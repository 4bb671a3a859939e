//! Shared Types
//!
//! Session and user types exchanged between the session manager, the
//! request pipeline, and embedding code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user without the secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// The currently authenticated identity, as read back from the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    pub email: String,
}

/// An authenticated session with its opaque token
///
/// Persisted verbatim under the `auth_user` key. The token carries no
/// verifiable claims; it only marks that a login happened in some process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub email: String,
    pub token: String,
}

impl Session {
    /// The identity half of the session
    pub fn user(&self) -> SessionUser {
        SessionUser {
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Successful login/register result handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub token: String,
    pub user: SessionUser,
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        Self {
            token: session.token.clone(),
            user: session.user(),
        }
    }
}
