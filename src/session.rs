//! Session Manager
//!
//! Owns the authenticated/unauthenticated state machine and its
//! persistence, and orchestrates login, registration, logout, and the
//! password recovery/reset flows against the user store.
//!
//! # State machine
//!
//! Two states, `Unauthenticated` and `Authenticated`, tracked as the
//! presence of a [`Session`]. Login or registration success enters
//! `Authenticated`; logout or a forced expiry from the request pipeline
//! leaves it. A login or registration while already authenticated simply
//! overwrites the active session.
//!
//! # Persistence and restore
//!
//! The session is written under the `auth_user` and `auth_token` keys the
//! moment it is established. On construction the manager re-establishes a
//! persisted session without consulting the user store - the token is
//! trusted as read. That is a stand-in behavior, not a security property.
//!
//! # Timing
//!
//! The flow operations resolve after a fixed simulated latency standing in
//! for a backend round trip. State is committed before the wait begins, so
//! abandoning a pending call never undoes a successful login.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::sleep;

use crate::error::AuthError;
use crate::storage::{Storage, AUTH_TOKEN_KEY, AUTH_USER_KEY};
use crate::types::{Session, SessionInfo, SessionUser};
use crate::users::UserDb;

/// Client-held session manager
///
/// Obtain one explicitly and share it behind an `Arc`; there is no global
/// instance. At most one session exists per manager.
#[derive(Debug)]
pub struct SessionManager {
    users: Arc<UserDb>,
    storage: Arc<dyn Storage>,
    session: Mutex<Option<Session>>,
    auth_tx: watch::Sender<bool>,
    latency: Duration,
    token_seq: AtomicU64,
}

impl SessionManager {
    /// Create a manager, restoring any persisted session
    ///
    /// `latency` is the simulated backend round trip applied to the flow
    /// operations; tests pass `Duration::ZERO`.
    pub fn new(users: Arc<UserDb>, storage: Arc<dyn Storage>, latency: Duration) -> Self {
        let restored = restore_session(storage.as_ref());
        if let Some(session) = &restored {
            tracing::info!("restored session for '{}'", session.username);
        }
        let (auth_tx, _) = watch::channel(restored.is_some());

        Self {
            users,
            storage,
            session: Mutex::new(restored),
            auth_tx,
            latency,
            token_seq: AtomicU64::new(0),
        }
    }

    /// Log in with a username and password
    ///
    /// The username is matched case-insensitively, the password exactly.
    /// On a match the session is minted, persisted, and observable
    /// immediately; the returned future still resolves only after the
    /// simulated latency. On a mismatch nothing changes.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` when the pair matches no registered user.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionInfo, AuthError> {
        let outcome = match self.users.validate_credentials(username, password) {
            Some(user) => {
                let info = self.establish_session(&user.username, &user.email);
                tracing::info!("user '{}' logged in", user.username);
                Ok(info)
            }
            None => {
                tracing::warn!("login rejected for '{}'", username);
                Err(AuthError::InvalidCredentials)
            }
        };

        sleep(self.latency).await;
        outcome
    }

    /// Register a new user and log them in
    ///
    /// Delegates validation and uniqueness to the user store; its error is
    /// propagated unmutated. On success a session is established exactly
    /// as in [`login`](Self::login), under the case-folded identity.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionInfo, AuthError> {
        let outcome = match self.users.register(username, email, password) {
            Ok(()) => {
                let username = username.trim().to_lowercase();
                let email = email.trim().to_lowercase();
                let info = self.establish_session(&username, &email);
                tracing::info!("user '{}' registered and logged in", username);
                Ok(info)
            }
            Err(err) => Err(err),
        };

        sleep(self.latency).await;
        outcome
    }

    /// Clear the session
    ///
    /// Removes the persisted artifacts and the in-memory session. Always
    /// succeeds; calling it with no active session is a no-op.
    pub fn logout(&self) {
        self.storage.remove(AUTH_TOKEN_KEY);
        self.storage.remove(AUTH_USER_KEY);
        if self.set_session(None) {
            tracing::info!("session cleared");
        }
    }

    /// Request a password recovery email for a username or email
    ///
    /// The identifier is not checked against the user store; any non-empty
    /// value resolves successfully after the simulated latency.
    pub async fn request_password_recovery(&self, identifier: &str) -> Result<String, AuthError> {
        let outcome = if identifier.trim().is_empty() {
            Err(AuthError::validation(
                "identifier",
                "Username or email is required",
            ))
        } else {
            tracing::info!("password recovery requested for '{}'", identifier.trim());
            Ok("Recovery email sent".to_string())
        };

        sleep(self.latency).await;
        outcome
    }

    /// Reset a password using a recovery token
    ///
    /// Validates shape only: the token must be non-empty and the new secret
    /// at least 6 characters. The new secret is not written back to the
    /// user store.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<String, AuthError> {
        let outcome = if token.trim().is_empty() {
            Err(AuthError::validation("token", "Reset token is required"))
        } else if new_password.chars().count() < 6 {
            Err(AuthError::validation(
                "password",
                "Password must be at least 6 characters",
            ))
        } else {
            tracing::info!("password reset accepted");
            Ok("Password reset successfully".to_string())
        };

        sleep(self.latency).await;
        outcome
    }

    /// The currently authenticated identity, if any
    pub fn current_user(&self) -> Option<SessionUser> {
        self.session
            .lock()
            .expect("session lock poisoned")
            .as_ref()
            .map(Session::user)
    }

    /// The active session token, if any
    pub fn token(&self) -> Option<String> {
        self.session
            .lock()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.token.clone())
    }

    /// Whether a session is active
    pub fn is_authenticated(&self) -> bool {
        self.session
            .lock()
            .expect("session lock poisoned")
            .is_some()
    }

    /// Subscribe to auth-state transitions
    ///
    /// The receiver holds the current value at subscription time and is
    /// notified on every later transition. The emitted flag always equals
    /// "a session exists", and the emission happens after the in-memory
    /// state write it reports.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.auth_tx.subscribe()
    }

    /// The user store this manager validates against
    pub fn users(&self) -> &Arc<UserDb> {
        &self.users
    }

    fn establish_session(&self, username: &str, email: &str) -> SessionInfo {
        let session = Session {
            username: username.to_string(),
            email: email.to_string(),
            token: self.mint_token(),
        };
        let info = SessionInfo::from(&session);

        self.persist_session(&session);
        self.set_session(Some(session));
        info
    }

    // A failed persistence write is logged and does not abort the login;
    // the in-memory session stays authoritative for this process.
    fn persist_session(&self, session: &Session) {
        if let Err(err) = self.storage.set(AUTH_TOKEN_KEY, &session.token) {
            tracing::error!("failed to persist session token: {}", err);
        }
        match serde_json::to_string(session) {
            Ok(json) => {
                if let Err(err) = self.storage.set(AUTH_USER_KEY, &json) {
                    tracing::error!("failed to persist session record: {}", err);
                }
            }
            Err(err) => tracing::error!("failed to encode session record: {}", err),
        }
    }

    // Single writer for the session slot. The watch emission is issued
    // after the slot is updated and only on an actual transition, keeping
    // the stream equal to `session.is_some()` at all times.
    fn set_session(&self, next: Option<Session>) -> bool {
        let authenticated = next.is_some();
        {
            let mut session = self.session.lock().expect("session lock poisoned");
            *session = next;
        }
        self.auth_tx.send_if_modified(|state| {
            let changed = *state != authenticated;
            *state = authenticated;
            changed
        })
    }

    // Tokens are opaque and carry no claims; the counter makes them unique
    // within a process lifetime even when minted in the same millisecond.
    fn mint_token(&self) -> String {
        let seq = self.token_seq.fetch_add(1, Ordering::Relaxed);
        format!("mock-token-{}-{}", Utc::now().timestamp_millis(), seq)
    }
}

fn restore_session(storage: &dyn Storage) -> Option<Session> {
    let raw = storage.get(AUTH_USER_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(err) => {
            tracing::warn!("failed to restore persisted session: {}", err);
            None
        }
    }
}
