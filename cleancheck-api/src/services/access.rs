//! Role-based access decisions
//!
//! Every admin-only or owner-only check goes through [`authorize`], and
//! history/stats visibility through [`visibility`].

use cleancheck_common::Role;
use thiserror::Error;

use crate::store::HistoryFilter;

/// Authenticated caller, attached to the request by the auth middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub name: String,
    pub role: Role,
    pub token: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Operations that need a capability check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// List, create or delete accounts
    ManageUsers,
    /// Change an inspection's summary or score
    EditInspection,
    /// Delete an inspection authored by `owner`
    DeleteInspection { owner: &'a str },
    /// Read every user's history and stats
    ViewAllInspections,
}

/// Capability check failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("Admin access required")]
    AdminRequired,

    #[error("You can only delete your own inspections")]
    NotOwner,
}

/// Allow or deny `action` for `actor`
pub fn authorize(actor: &AuthUser, action: Action<'_>) -> Result<(), AccessDenied> {
    if actor.is_admin() {
        return Ok(());
    }

    match action {
        Action::ManageUsers | Action::EditInspection | Action::ViewAllInspections => {
            Err(AccessDenied::AdminRequired)
        }
        Action::DeleteInspection { owner } if owner == actor.username => Ok(()),
        Action::DeleteInspection { .. } => Err(AccessDenied::NotOwner),
    }
}

/// Records `actor` may read: admins see everything, staff their own
pub fn visibility(actor: &AuthUser) -> HistoryFilter {
    match authorize(actor, Action::ViewAllInspections) {
        Ok(()) => HistoryFilter::All,
        Err(_) => HistoryFilter::ByOwner(actor.username.clone()),
    }
}
