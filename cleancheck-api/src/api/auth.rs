//! Session authentication
//!
//! Bearer tokens are minted at login and checked by [`auth_middleware`] on
//! every protected route. The middleware re-reads the account on each
//! request, so deleting a user invalidates their tokens immediately.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use cleancheck_common::Role;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::extract::JsonBody;
use crate::error::{ApiError, ApiResult};
use crate::services::AuthUser;
use crate::AppState;

/// Authentication middleware
///
/// Attaches [`AuthUser`] to the request extensions on success.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(&request).ok_or(ApiError::Unauthenticated)?;

    let session = state
        .sessions
        .get(&token)
        .await
        .ok_or(ApiError::SessionInvalid)?;

    let user = match state.users.get(&session.username).await {
        Some(user) => user,
        None => {
            warn!(username = %session.username, "Session refers to a deleted account");
            return Err(ApiError::SessionInvalid);
        }
    };

    request.extensions_mut().insert(AuthUser {
        username: user.username,
        name: user.name,
        role: user.role,
        token,
    });

    Ok(next.run(request).await)
}

/// Token from `Authorization: Bearer <token>`
fn bearer_token(request: &Request) -> Option<String> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Identity returned at login
#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub username: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    pub token: String,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let Some(user) = state.users.verify(&request.username, &request.password).await else {
        warn!(username = %request.username, "Login rejected");
        return Err(ApiError::InvalidCredentials);
    };

    let session = state.sessions.create(&user.username, user.role).await;
    info!(username = %user.username, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        user: LoginUser {
            username: user.username,
            name: user.name,
            role: user.role,
        },
        token: session.token,
    }))
}

/// Generic `{success, message}` acknowledgement
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

/// POST /api/logout
///
/// Idempotent: a token that is already gone still yields success.
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Json<Ack> {
    state.sessions.remove(&user.token).await;
    info!(username = %user.username, "User logged out");
    Ack::new("Logged out successfully")
}
