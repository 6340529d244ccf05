//! Session store
//!
//! Maps opaque bearer tokens to logged-in users. Sessions have no expiry;
//! they live until logout, until their user is deleted, or until the
//! process exits.

use chrono::{DateTime, Utc};
use cleancheck_common::Role;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One logged-in session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: Role,
    pub login_time: DateTime<Utc>,
}

/// Process-wide session table, cheap to clone
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh token and record a session for `username`
    pub async fn create(&self, username: &str, role: Role) -> Session {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            username: username.to_string(),
            role,
            login_time: Utc::now(),
        };

        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());

        session
    }

    pub async fn get(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Remove one session; returns whether it existed
    pub async fn remove(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Remove every session belonging to `username`; returns how many
    pub async fn remove_for_user(&self, username: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.username != username);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
