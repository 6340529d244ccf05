//! In-memory stores
//!
//! Each store is a cloneable handle around shared state, constructed once
//! at startup and injected into handlers through `AppState`. Nothing is
//! persisted across restarts.

pub mod inspections;
pub mod sessions;
pub mod users;

pub use inspections::{HistoryFilter, InspectionError, InspectionStore, HISTORY_CAPACITY};
pub use sessions::{Session, SessionStore};
pub use users::{NewUser, User, UserDirectory, UserError, UserSummary, SEEDED_ADMIN_USERNAME};
