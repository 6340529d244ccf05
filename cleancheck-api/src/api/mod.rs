//! HTTP API handlers for cleancheck-api

pub mod analyze;
pub mod auth;
pub mod extract;
pub mod health;
pub mod history;
pub mod tasks;
pub mod users;

pub use analyze::{analyze, analyze_upload};
pub use auth::{auth_middleware, login, logout};
pub use health::health_routes;
pub use history::{delete_inspection, get_stats, list_history, update_description, update_score};
pub use tasks::list_tasks;
pub use users::{create_user, delete_user, list_users};
