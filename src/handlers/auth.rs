//! Authentication handlers

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use crate::middleware::AuthUser;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::state::AppState;
use crate::utils::errors::Result;

/// User together with the token also set as the session cookie
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

fn with_session(state: &AppState, status: StatusCode, user: User, token: String) -> Response {
    let cookie = state.services.auth_service.session_cookie(token.clone());
    (
        status,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(SessionResponse { user, token }),
    )
        .into_response()
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response> {
    let (user, token) = state.services.user_service.register(request).await?;
    Ok(with_session(&state, StatusCode::CREATED, user, token))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response> {
    let (user, token) = state.services.user_service.login(request).await?;
    Ok(with_session(&state, StatusCode::OK, user, token))
}

/// POST /api/auth/logout
pub async fn handle_logout(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Response> {
    state.services.user_service.logout(user.id).await?;
    debug!(user_id = user.id, "Session cookie cleared");

    let cookie = state.services.auth_service.clear_cookie();
    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response())
}

/// GET /api/auth/me
pub async fn handle_me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
