//! In-memory map from visitor id to session state.

use crate::models::session::Session;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to one visitor's session. Holding the lock serializes
/// generations for that visitor.
pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionHandle>>,
    initial_credits: u32,
}

impl SessionStore {
    pub fn new(initial_credits: u32) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            initial_credits,
        }
    }

    /// Handle for `id`, creating a fresh session on first access.
    pub fn get_session(&self, id: &str) -> SessionHandle {
        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::debug!(visitor_id = %id, credits = self.initial_credits, "Session created");
                Arc::new(Mutex::new(Session::new(self.initial_credits)))
            })
            .clone()
    }

    /// Drop sessions not seen within `max_idle`. A session whose handle is
    /// held outside the map is in use and always kept, locked or not.
    /// Returns the number removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let before = self.sessions.len();

        self.sessions.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(session) => session.last_seen >= cutoff,
                Err(_) => true,
            }
        });

        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::info!(removed, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
