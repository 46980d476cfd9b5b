//! Event comment handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use crate::middleware::AuthUser;
use crate::models::{Comment, CommentWithAuthor, CreateCommentRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

/// GET /api/events/:id/comments
pub async fn handle_list_comments(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<CommentWithAuthor>>> {
    Ok(Json(state.services.comment_service.list(&user, event_id).await?))
}

/// POST /api/events/:id/comments
pub async fn handle_create_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    let comment = state.services.comment_service.create(&user, event_id, &request.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/events/:id/comments/:comment_id
pub async fn handle_delete_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((event_id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    state.services.comment_service.delete(&user, event_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
