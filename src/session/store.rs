use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::{Session, SessionId};

/// Process-wide in-memory store of chat sessions.
///
/// Sessions are created lazily and live until the store is dropped.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, Arc<Mutex<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session for a chat, creating it on first use
    pub fn get_or_create(&self, session_id: SessionId) -> Arc<Mutex<Session>> {
        self.sessions
            .entry(session_id)
            .or_insert_with(|| {
                debug!(session_id, "Creating session");
                Arc::new(Mutex::new(Session::new(session_id)))
            })
            .clone()
    }

    pub fn get(&self, session_id: SessionId) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(&session_id).map(|entry| entry.value().clone())
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
