//! In-memory session store.
//!
//! A session pairs one loaded statement (transactions + summary) with the
//! questions asked about it. Sessions live as long as the process.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use tally_core::{CsvFormat, Summary, Transaction};
use tally_ingest::ParsedStatement;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        SessionId(s.trim().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// RFC 3339
    pub timestamp: String,
}

impl Message {
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub file_path: PathBuf,
    pub format: CsvFormat,
    pub transactions: Vec<Transaction>,
    pub summary: Summary,
    pub messages: Vec<Message>,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
    order: Vec<SessionId>,
    next_id: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, file_path: impl Into<PathBuf>, parsed: ParsedStatement, summary: Summary) -> SessionId {
        self.next_id += 1;
        let id = SessionId(format!("sess-{:04}", self.next_id));
        let session = Session {
            id: id.clone(),
            file_path: file_path.into(),
            format: parsed.format,
            transactions: parsed.transactions,
            summary,
            messages: Vec::new(),
        };
        self.sessions.insert(id.clone(), session);
        self.order.push(id.clone());
        tracing::debug!(session = %id, "session created");
        id
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Ids in creation order
    pub fn list(&self) -> &[SessionId] {
        &self.order
    }

    pub fn remove(&mut self, id: &SessionId) -> Option<Session> {
        let removed = self.sessions.remove(id)?;
        self.order.retain(|x| x != id);
        tracing::debug!(session = %id, "session removed");
        Some(removed)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
