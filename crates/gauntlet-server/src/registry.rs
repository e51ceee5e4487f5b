//! In-memory registry of active sessions.
//!
//! Each session sits behind its own `tokio::sync::Mutex`, so utterances for
//! one session are applied strictly one at a time while different sessions
//! proceed in parallel. The map itself uses a `std::sync::RwLock`: every
//! acquisition is a brief lookup or insert and never spans an `.await`.

use gauntlet_engine::{aggregate_scorecard, Scorecard, SessionState};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, MutexGuard};

/// State guarded by a session's lock.
#[derive(Debug)]
pub struct SessionSlot {
    pub state: SessionState,
    /// Scorecard frozen by the first `end` attempt. Kept until every sink
    /// has accepted it so a retry hands them the same record.
    pub pending: Option<Scorecard>,
    /// Set once every sink stored the scorecard.
    pub ended: bool,
}

impl SessionSlot {
    fn new(state: SessionState) -> Self {
        Self {
            state,
            pending: None,
            ended: false,
        }
    }

    /// Whether utterances are still accepted.
    pub fn is_open(&self) -> bool {
        !self.ended && self.pending.is_none()
    }

    /// The scorecard to hand to sinks, aggregated once on first call.
    pub fn freeze_scorecard(&mut self) -> Scorecard {
        let state = &self.state;
        self.pending
            .get_or_insert_with(|| aggregate_scorecard(state))
            .clone()
    }
}

#[derive(Debug)]
pub struct SessionHandle {
    id: String,
    slot: Mutex<SessionSlot>,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Waits for exclusive access to the session.
    pub async fn lock(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().await
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<SessionHandle>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session under `id`.
    pub fn insert(&self, id: String, state: SessionState) -> Arc<SessionHandle> {
        let handle = Arc::new(SessionHandle {
            id: id.clone(),
            slot: Mutex::new(SessionSlot::new(state)),
        });
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.insert(id, Arc::clone(&handle));
        handle
    }

    pub fn get(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(id)
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
