//! Admin handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use crate::middleware::AdminUser;
use crate::models::{Activity, ActivityFilter, Setting, SystemStats, UpsertSettingRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

/// GET /api/admin/activities
pub async fn handle_activities(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(filter): Query<ActivityFilter>,
) -> Result<Json<Vec<Activity>>> {
    Ok(Json(state.services.admin_service.activities(&filter).await?))
}

/// GET /api/admin/stats
pub async fn handle_stats(State(state): State<AppState>, AdminUser(_): AdminUser) -> Result<Json<SystemStats>> {
    Ok(Json(state.services.admin_service.stats().await?))
}

/// GET /api/admin/settings
pub async fn handle_list_settings(State(state): State<AppState>, AdminUser(_): AdminUser) -> Result<Json<Vec<Setting>>> {
    Ok(Json(state.services.admin_service.settings().await?))
}

/// PUT /api/admin/settings/:key
pub async fn handle_put_setting(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(key): Path<String>,
    Json(request): Json<UpsertSettingRequest>,
) -> Result<Json<Setting>> {
    Ok(Json(state.services.admin_service.put_setting(&admin, &key, request.value).await?))
}
