//! Key-Value Storage
//!
//! String-keyed persistence for auth state, filling the role browser
//! local storage plays for a web client. Three keys exist:
//!
//! | Key | Content | Written by |
//! |---|---|---|
//! | `auth_token` | opaque session token | session manager |
//! | `auth_user` | JSON session record | session manager |
//! | `mock_users_db` | JSON array of user records | user store |
//!
//! `FileStorage` keeps one file per key under the platform data directory;
//! `MemoryStorage` backs tests. Reads degrade to absent on any failure so a
//! corrupt value can never take the session layer down.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::AuthError;

/// Session token key
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Persisted session record key
pub const AUTH_USER_KEY: &str = "auth_user";
/// Registered users key
pub const USERS_DB_KEY: &str = "mock_users_db";

/// String-keyed store shared by the session manager and the user store
///
/// Each owner writes a disjoint subset of keys. Implementations must be
/// safe to share behind an `Arc`.
pub trait Storage: Send + Sync + Debug {
    /// Read a value, absent on any failure
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value, replacing any previous one in a single step
    fn set(&self, key: &str, value: &str) -> Result<(), AuthError>;
    /// Remove a value; removing an absent key is a no-op
    fn remove(&self, key: &str);
}

/// Platform data directory for persisted auth state
///
/// Uses the system data directory when available, the temp directory
/// otherwise.
pub fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    path.push("xfauth");
    path
}

/// File-backed storage, one file per key
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| AuthError::storage(format!("create {}: {}", root.display(), e)))?;
        Ok(Self { root })
    }

    /// Open storage in the default platform data directory
    pub fn open_default() -> Result<Self, AuthError> {
        Self::new(default_data_dir())
    }

    /// Directory this store writes into
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!("failed to read key '{}': {}", key, err);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        fs::write(self.path_for(key), value)
            .map_err(|e| AuthError::storage(format!("write key '{}': {}", key, e)))
    }

    fn remove(&self, key: &str) {
        if let Err(err) = fs::remove_file(self.path_for(key)) {
            if err.kind() != ErrorKind::NotFound {
                tracing::warn!("failed to remove key '{}': {}", key, err);
            }
        }
    }
}

/// In-memory storage for tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("storage lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.entries
            .lock()
            .expect("storage lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .expect("storage lock poisoned")
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("missing"), None);

        storage.set("auth_token", "mock-token-1").unwrap();
        assert_eq!(storage.get("auth_token"), Some("mock-token-1".to_string()));

        storage.set("auth_token", "mock-token-2").unwrap();
        assert_eq!(storage.get("auth_token"), Some("mock-token-2".to_string()));

        storage.remove("auth_token");
        assert_eq!(storage.get("auth_token"), None);
    }

    #[test]
    fn test_memory_storage_remove_absent_key() {
        let storage = MemoryStorage::new();
        storage.remove("never_written");
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert_eq!(storage.get(AUTH_TOKEN_KEY), None);
        storage.set(AUTH_TOKEN_KEY, "mock-token-42").unwrap();
        assert_eq!(
            storage.get(AUTH_TOKEN_KEY),
            Some("mock-token-42".to_string())
        );

        storage.remove(AUTH_TOKEN_KEY);
        assert_eq!(storage.get(AUTH_TOKEN_KEY), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::new(dir.path()).unwrap();
            storage.set(USERS_DB_KEY, "[]").unwrap();
        }
        let storage = FileStorage::new(dir.path()).unwrap();
        assert_eq!(storage.get(USERS_DB_KEY), Some("[]".to_string()));
    }

    #[test]
    fn test_file_storage_creates_nested_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::new(&nested).unwrap();
        storage.set("key", "value").unwrap();
        assert_eq!(storage.get("key"), Some("value".to_string()));
    }

    #[test]
    fn test_default_data_dir_ends_with_app_name() {
        let path = default_data_dir();
        assert!(path.ends_with("xfauth"));
    }
}
