//! Health check handler

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::warn;
use crate::state::AppState;

/// GET /health
pub async fn handle_health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let health = state.services.health_check().await;

    if health.is_healthy() {
        (StatusCode::OK, Json(json!({ "status": "ok", "database": true })))
    } else {
        let issues = health.get_issues();
        warn!(issues = ?issues, "Health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "database": health.database_healthy, "issues": issues })),
        )
    }
}
