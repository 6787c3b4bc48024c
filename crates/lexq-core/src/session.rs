//! Session-keyed conversation memory

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::llm::Role;
use crate::{Error, Result};

/// One (role, text) entry in a session transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// An ordered, append-only transcript for one session id
#[derive(Debug, Clone)]
struct Session {
    turns: Vec<Turn>,
    last_active: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            turns: Vec::new(),
            last_active: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

/// Store mapping session ids to conversation transcripts
///
/// Sessions are created lazily on first reference to an unseen id.
/// All map access goes through one lock held inside the store, and
/// sessions idle longer than `max_idle` are dropped by `evict_stale`,
/// so the map does not grow without bound across a long process life.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    max_idle: Duration,
}

impl SessionStore {
    /// Create a new session store with the given idle expiry
    pub fn new(max_idle: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_idle,
        }
    }

    /// Return the transcript for a session id, creating the session if unseen
    pub fn history(&self, session_id: &str) -> Result<Vec<Turn>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| Error::Session(format!("Lock error: {}", e)))?;

        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(Session::new);
        session.touch();

        Ok(session.turns.clone())
    }

    /// Append one turn to a session, in arrival order
    pub fn append(&self, session_id: &str, role: Role, text: &str) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| Error::Session(format!("Lock error: {}", e)))?;

        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(Session::new);
        session.turns.push(Turn::new(role, text));
        session.touch();

        Ok(())
    }

    /// Drop sessions idle longer than the configured expiry
    pub fn evict_stale(&self) -> Result<usize> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| Error::Session(format!("Lock error: {}", e)))?;

        let before = sessions.len();
        sessions.retain(|_, session| session.last_active.elapsed() < self.max_idle);

        Ok(before - sessions.len())
    }

    /// Number of live sessions
    pub fn len(&self) -> Result<usize> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| Error::Session(format!("Lock error: {}", e)))?;
        Ok(sessions.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
