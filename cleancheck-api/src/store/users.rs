//! User directory
//!
//! In-memory account table seeded with one permanent admin. Passwords are
//! compared by plain equality; this service is not a hardened identity
//! provider.

use chrono::{DateTime, Utc};
use cleancheck_common::Role;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Username of the seeded admin account (cannot be deleted)
pub const SEEDED_ADMIN_USERNAME: &str = "wisag";
const SEEDED_ADMIN_PASSWORD: &str = "wisag";
const SEEDED_ADMIN_NAME: &str = "WISAG Administrator";

/// Maximum number of staff accounts that may exist at once
pub const MAX_STAFF_ACCOUNTS: usize = 2;

/// User directory errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("Username, password and name are required")]
    MissingFields,

    #[error("Username already exists: {0}")]
    UsernameExists(String),

    #[error("Invalid role: {0} (expected \"admin\" or \"staff\")")]
    InvalidRole(String),

    #[error("Staff limit reached: at most {} staff accounts are allowed", MAX_STAFF_ACCOUNTS)]
    StaffLimitReached,

    #[error("The account {0} is protected and cannot be deleted")]
    ProtectedAccount(String),

    #[error("User not found: {0}")]
    UserNotFound(String),
}

/// Stored account
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            username: self.username.clone(),
            name: self.name.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Account as exposed over the API (no password)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub username: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Account creation request
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    /// Role name; `None` means staff
    pub role: Option<String>,
}

/// Process-wide account table, cheap to clone
#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory {
    /// Create a directory containing only the seeded admin
    pub fn new() -> Self {
        let admin = User {
            username: SEEDED_ADMIN_USERNAME.to_string(),
            password: SEEDED_ADMIN_PASSWORD.to_string(),
            name: SEEDED_ADMIN_NAME.to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
        };

        let mut users = HashMap::new();
        users.insert(admin.username.clone(), admin);

        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }

    /// Exact-match credential check
    pub async fn verify(&self, username: &str, password: &str) -> Option<User> {
        self.users
            .read()
            .await
            .get(username)
            .filter(|user| user.password == password)
            .cloned()
    }

    pub async fn get(&self, username: &str) -> Option<User> {
        self.users.read().await.get(username).cloned()
    }

    /// All accounts, oldest first
    pub async fn list(&self) -> Vec<UserSummary> {
        let mut summaries: Vec<UserSummary> =
            self.users.read().await.values().map(User::summary).collect();
        summaries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.username.cmp(&b.username))
        });
        summaries
    }

    pub async fn create(&self, new_user: NewUser) -> Result<UserSummary, UserError> {
        let username = new_user.username.trim();
        let name = new_user.name.trim();
        if username.is_empty() || name.is_empty() || new_user.password.is_empty() {
            return Err(UserError::MissingFields);
        }

        let role = match new_user.role.as_deref() {
            None => Role::Staff,
            Some(raw) => Role::from_name(raw).ok_or_else(|| UserError::InvalidRole(raw.to_string()))?,
        };

        // Single write guard across the uniqueness and cap checks
        let mut users = self.users.write().await;

        if users.contains_key(username) {
            return Err(UserError::UsernameExists(username.to_string()));
        }

        if role == Role::Staff {
            let staff_count = users.values().filter(|u| u.role == Role::Staff).count();
            if staff_count >= MAX_STAFF_ACCOUNTS {
                return Err(UserError::StaffLimitReached);
            }
        }

        let user = User {
            username: username.to_string(),
            password: new_user.password,
            name: name.to_string(),
            role,
            created_at: Utc::now(),
        };
        let summary = user.summary();
        users.insert(user.username.clone(), user);

        Ok(summary)
    }

    /// Delete an account. Sessions are not touched here; see
    /// [`crate::store::SessionStore::remove_for_user`].
    pub async fn delete(&self, username: &str) -> Result<UserSummary, UserError> {
        if username == SEEDED_ADMIN_USERNAME {
            return Err(UserError::ProtectedAccount(username.to_string()));
        }

        self.users
            .write()
            .await
            .remove(username)
            .map(|user| user.summary())
            .ok_or_else(|| UserError::UserNotFound(username.to_string()))
    }
}
