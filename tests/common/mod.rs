//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use xfauth::guard::Navigator;
use xfauth::{MemoryStorage, SessionManager, UserDb};

/// Session manager over fresh in-memory storage, zero latency
pub fn memory_session() -> (Arc<MemoryStorage>, Arc<SessionManager>) {
    let storage = Arc::new(MemoryStorage::new());
    let session = session_over(storage.clone());
    (storage, session)
}

/// Session manager over existing storage, zero latency
pub fn session_over(storage: Arc<MemoryStorage>) -> Arc<SessionManager> {
    let users = Arc::new(UserDb::new(storage.clone()));
    Arc::new(SessionManager::new(users, storage, Duration::ZERO))
}

/// Records every navigation the pipeline issues
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.visits.lock().unwrap().push(route.to_string());
    }
}
