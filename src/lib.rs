//! XFAuth - Client-Held Authentication
//!
//! XFAuth is a client-side authentication and session library: it issues
//! and tracks a login session, validates credentials against a local user
//! store, mediates password recovery/reset flows, gates restricted views,
//! and attaches the session credential to every outgoing request.
//!
//! # Overview
//!
//! The crate is the stateful core of a client application. Rendering,
//! routing tables, and styling live in the embedding shell and consume
//! this crate through a handful of seams:
//!
//! - **`users`** - The credential store. A local stand-in for a backend
//!   user service with validation, case-folded uniqueness, and JSON
//!   persistence.
//! - **`session`** - The session manager. Owns the single
//!   authenticated/unauthenticated state machine, persists and restores
//!   sessions, and broadcasts transitions on a watch channel.
//! - **`client`** - The request pipeline. Injects the bearer credential,
//!   defaults the content type, and reclassifies transport failures into
//!   the domain error taxonomy, forcing a logout on authentication expiry.
//! - **`guard`** - The pre-navigation access check and the `Navigator`
//!   seam the shell implements.
//! - **`storage`**, **`config`**, **`error`**, **`types`** - the ambient
//!   pieces the above are built on.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xfauth::{Config, FileStorage, SessionManager, Storage, UserDb};
//!
//! # async fn example() -> Result<(), xfauth::AuthError> {
//! let config = Config::new();
//! let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(config.data_dir())?);
//! let users = Arc::new(UserDb::new(storage.clone()));
//! let session = Arc::new(SessionManager::new(users, storage, config.latency()));
//!
//! let info = session.login("testuser", "password123").await?;
//! println!("logged in as {}", info.user.username);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! The core expects a single logical actor: one session-mutating call in
//! flight at a time, driven from an event-style caller. The simulated
//! backend latency inside the flow operations is the only suspension
//! point; all accessors are synchronous. State is committed before that
//! wait begins, so cancelling a pending call never rolls back a login.
//!
//! # Error Handling
//!
//! All failures resolve to an [`error::AuthError`] value the caller can
//! branch on. Nothing in this crate treats an I/O or validation failure
//! as fatal to the process.

/// Runtime configuration
pub mod config;
/// Error taxonomy
pub mod error;
/// Access guard and navigation seam
pub mod guard;
/// Session manager
pub mod session;
/// Key-value persistence
pub mod storage;
/// Shared session/user types
pub mod types;
/// Credential store
pub mod users;

/// Request pipeline
pub mod client;

pub use client::ApiClient;
pub use config::Config;
pub use error::AuthError;
pub use guard::{GuardOutcome, Navigator, RouteKind};
pub use session::SessionManager;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use types::{Session, SessionInfo, SessionUser, UserView};
pub use users::UserDb;
