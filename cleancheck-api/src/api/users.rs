//! Account management endpoints (admin only)

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use super::auth::Ack;
use super::extract::JsonBody;
use crate::error::ApiResult;
use crate::services::{authorize, Action, AuthUser};
use crate::store::{NewUser, UserSummary};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    authorize(&actor, Action::ManageUsers)?;
    Ok(Json(state.users.list().await))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> ApiResult<Json<UserSummary>> {
    authorize(&actor, Action::ManageUsers)?;

    let created = state
        .users
        .create(NewUser {
            username: request.username,
            password: request.password,
            name: request.name,
            role: request.role,
        })
        .await?;

    info!(
        admin = %actor.username,
        username = %created.username,
        role = %created.role,
        "User created"
    );
    Ok(Json(created))
}

/// DELETE /api/users/:username
///
/// Revokes every session the deleted account held.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(username): Path<String>,
) -> ApiResult<Json<Ack>> {
    authorize(&actor, Action::ManageUsers)?;

    let deleted = state.users.delete(&username).await?;
    let revoked = state.sessions.remove_for_user(&deleted.username).await;

    info!(
        admin = %actor.username,
        username = %deleted.username,
        revoked,
        "User deleted"
    );
    Ok(Ack::new(format!("User {} deleted", deleted.username)))
}
