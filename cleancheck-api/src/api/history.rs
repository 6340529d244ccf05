//! Inspection history and statistics endpoints
//!
//! Reads are filtered by [`visibility`]; edits and deletes go through
//! [`authorize`].

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use cleancheck_common::Inspection;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::auth::Ack;
use super::extract::JsonBody;
use crate::error::{ApiError, ApiResult};
use crate::services::stats::{self, InspectionStats};
use crate::services::{authorize, visibility, Action, AuthUser};
use crate::store::inspections::parse_score;
use crate::store::InspectionError;
use crate::AppState;

/// Page size when the client gives none
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Kept as text so a malformed value falls back to the default
    #[serde(default)]
    pub limit: Option<String>,
}

impl HistoryQuery {
    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
    }
}

/// GET /api/history?limit=N
pub async fn list_history(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<Inspection>> {
    let filter = visibility(&actor);
    Json(state.inspections.list(&filter, Some(query.limit())).await)
}

/// GET /api/stats
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> Json<InspectionStats> {
    let visible = state.inspections.list(&visibility(&actor), None).await;
    Json(stats::compute(&visible))
}

/// DELETE /api/history/:id
pub async fn delete_inspection(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ack>> {
    let id = parse_id(&id)?;
    let inspection = state
        .inspections
        .find(id)
        .await
        .ok_or_else(|| InspectionError::NotFound(id.to_string()))?;

    authorize(
        &actor,
        Action::DeleteInspection {
            owner: &inspection.user_id,
        },
    )?;

    state.inspections.delete(id).await?;
    info!(id = %id, by = %actor.username, "Inspection deleted");
    Ok(Ack::new("Inspection deleted"))
}

/// PUT /api/history/:id/description  `{"summary": "..."}`
pub async fn update_description(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Json<Inspection>> {
    authorize(&actor, Action::EditInspection)?;
    let id = parse_id(&id)?;

    let summary = body
        .get("summary")
        .and_then(Value::as_str)
        .ok_or(InspectionError::InvalidSummary)?;

    let updated = state.inspections.update_summary(id, summary).await?;
    info!(id = %id, by = %actor.username, "Inspection summary updated");
    Ok(Json(updated))
}

/// PUT /api/history/:id/score  `{"overallScore": 0..=100}`
pub async fn update_score(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Json<Inspection>> {
    authorize(&actor, Action::EditInspection)?;
    let id = parse_id(&id)?;

    let score = parse_score(body.get("overallScore").unwrap_or(&Value::Null))?;
    let updated = state.inspections.update_score(id, score).await?;
    info!(
        id = %id,
        by = %actor.username,
        score,
        quality = %updated.assessment.quality.as_str(),
        "Inspection score updated"
    );
    Ok(Json(updated))
}

/// Ids that are not UUIDs cannot exist in the store
fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::from(InspectionError::NotFound(raw.to_string())))
}
