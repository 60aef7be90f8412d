//! # Session State
//!
//! Each dashboard user owns one `Session` holding the current table and chat
//! history. Sessions are created and torn down explicitly, or reaped when idle.

use crate::{ingest::SourceKind, types::Table};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub source: Option<SourceKind>,
    pub table: Option<Table>,
    /// Bumped every time a table is loaded.
    pub table_generation: u64,
    pub chat_history: Vec<ChatMessage>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_active: now,
            source: None,
            table: None,
            table_generation: 0,
            chat_history: Vec::new(),
        }
    }

    /// Replaces the current table. The chat history belongs to the old table and is cleared.
    pub fn load_table(&mut self, table: Table, source: SourceKind) {
        self.table = Some(table);
        self.source = Some(source);
        self.table_generation += 1;
        self.chat_history.clear();
    }

    /// Records the exchange only if no other table was loaded since `generation`.
    /// Returns whether it was recorded.
    pub fn record_exchange_for(
        &mut self,
        generation: u64,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> bool {
        if self.table_generation != generation {
            return false;
        }
        self.record_exchange(question, answer);
        true
    }

    /// Appends a completed question and answer pair.
    pub fn record_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.chat_history.push(ChatMessage {
            role: Role::User,
            content: question.into(),
        });
        self.chat_history.push(ChatMessage {
            role: Role::Assistant,
            content: answer.into(),
        });
    }

    pub fn has_data(&self) -> bool {
        self.table.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// A shared, cloneable map of live sessions.
///
/// Callers receive snapshots; the lock is never held outside a store method.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Session {
        let session = Session::new(Utc::now());
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Applies `f` to a session and marks it active. Returns `None` for an unknown id.
    pub async fn update<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        session.last_active = Utc::now();
        Some(f(session))
    }

    /// Marks a session active without changing it.
    pub async fn touch(&self, id: Uuid) -> bool {
        self.update(id, |_| ()).await.is_some()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drops every session idle for longer than `ttl` at `now`. Returns how many were dropped.
    pub async fn purge_idle(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_active <= ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
