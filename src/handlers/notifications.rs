//! Notification inbox handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use crate::middleware::AuthUser;
use crate::models::Notification;
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread: bool,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/notifications
pub async fn handle_list_notifications(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state.services.notification_service
        .list(user.id, query.unread, query.page, query.limit)
        .await?;
    Ok(Json(notifications))
}

/// GET /api/notifications/unread-count
pub async fn handle_unread_count(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Value>> {
    let count = state.services.notification_service.unread_count(user.id).await?;
    Ok(Json(json!({ "count": count })))
}

/// PUT /api/notifications/:id/read
pub async fn handle_mark_read(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(notification_id): Path<i64>,
) -> Result<Json<Notification>> {
    Ok(Json(state.services.notification_service.mark_read(user.id, notification_id).await?))
}

/// PUT /api/notifications/read-all
pub async fn handle_mark_all_read(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Value>> {
    let updated = state.services.notification_service.mark_all_read(user.id).await?;
    Ok(Json(json!({ "updated": updated })))
}

/// DELETE /api/notifications/:id
pub async fn handle_delete_notification(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(notification_id): Path<i64>,
) -> Result<StatusCode> {
    state.services.notification_service.delete(user.id, notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
