//! User profile handlers

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use crate::middleware::AuthUser;
use crate::models::{ChangePasswordRequest, PublicUser, UpdateUserRequest, User};
use crate::state::AppState;
use crate::utils::errors::{EventHubError, Result};

const AVATAR_FIELD: &str = "avatar";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

/// GET /api/users/search
pub async fn handle_search(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<PublicUser>>> {
    let users = state.services.user_service.search(&query.q, query.limit.unwrap_or(10)).await?;
    Ok(Json(users))
}

/// GET /api/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<PublicUser>> {
    let user = state.services.user_service.get_user(user_id).await?;
    Ok(Json(PublicUser::from(&user)))
}

/// PUT /api/users/me
pub async fn handle_update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let updated = state.services.user_service.update_profile(&user, request).await?;
    Ok(Json(updated))
}

/// PUT /api/users/me/password
pub async fn handle_change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<Value>> {
    state.services.user_service.change_password(&user, request).await?;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// POST /api/users/me/avatar (multipart, field `avatar`)
pub async fn handle_upload_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<User>> {
    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("avatar").to_string();
        let bytes = field.bytes().await.map_err(invalid_upload)?;
        if bytes.is_empty() {
            return Err(EventHubError::Validation("Avatar file is empty".to_string()));
        }

        let updated = state.services.user_service.upload_avatar(&user, &filename, bytes.to_vec()).await?;
        return Ok(Json(updated));
    }

    Err(EventHubError::Validation(format!("Missing `{}` file field", AVATAR_FIELD)))
}

fn invalid_upload(err: axum::extract::multipart::MultipartError) -> EventHubError {
    EventHubError::Validation(format!("Invalid upload: {}", err))
}

/// DELETE /api/users/me
pub async fn handle_delete_me(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Response> {
    state.services.user_service.delete_account(&user).await?;

    let cookie = state.services.auth_service.clear_cookie();
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie.to_string())]).into_response())
}
