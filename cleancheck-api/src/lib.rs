//! cleancheck-api library - AI cleaning inspection service
//!
//! Grades photos of cleaned areas with a vision model against fixed
//! rubrics, keeps a bounded in-memory inspection history, and gates all of
//! it behind session logins with admin and staff roles.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod store;

use services::{AnalysisPipeline, VisionClient};
use store::{InspectionStore, SessionStore, UserDirectory};

/// JSON bodies carry base64 data URIs
pub const JSON_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Multipart envelope allowance on top of the image itself
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub users: UserDirectory,
    pub sessions: SessionStore,
    pub inspections: InspectionStore,
    pub pipeline: AnalysisPipeline,
    /// Server startup time (for uptime reporting)
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create fresh stores around the given vision client
    pub fn new(vision: Arc<dyn VisionClient>) -> Self {
        let inspections = InspectionStore::new();
        Self {
            users: UserDirectory::new(),
            sessions: SessionStore::new(),
            pipeline: AnalysisPipeline::new(vision, inspections.clone()),
            inspections,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post, put};

    // Protected routes (require a session token)
    let protected = Router::new()
        .route("/api/logout", post(api::logout))
        .route("/api/users", get(api::list_users).post(api::create_user))
        .route("/api/users/:username", delete(api::delete_user))
        .route("/api/analyze", post(api::analyze))
        .route(
            "/api/analyze-upload",
            post(api::analyze_upload).layer(DefaultBodyLimit::max(
                api::analyze::MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD,
            )),
        )
        .route("/api/history", get(api::list_history))
        .route("/api/history/:id", delete(api::delete_inspection))
        .route("/api/history/:id/description", put(api::update_description))
        .route("/api/history/:id/score", put(api::update_score))
        .route("/api/stats", get(api::get_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/tasks", get(api::list_tasks))
        .route("/api/login", post(api::login))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
