//! Event handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use crate::middleware::AuthUser;
use crate::models::{CreateEventRequest, Event, EventFilter, UpdateEventRequest};
use crate::services::EventPage;
use crate::state::AppState;
use crate::utils::errors::Result;

/// GET /api/events
pub async fn handle_list_events(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(filter): Query<EventFilter>,
) -> Result<Json<EventPage>> {
    Ok(Json(state.services.event_service.list_public(&filter).await?))
}

/// POST /api/events
pub async fn handle_create_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = state.services.event_service.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/events/mine
pub async fn handle_my_events(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Vec<Event>>> {
    Ok(Json(state.services.event_service.list_organized(&user).await?))
}

/// GET /api/events/attending
pub async fn handle_attending_events(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Event>>> {
    Ok(Json(state.services.event_service.list_attending(&user).await?))
}

/// GET /api/events/:id
pub async fn handle_get_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Json<Event>> {
    Ok(Json(state.services.event_service.get(&user, event_id).await?))
}

/// PUT /api/events/:id
pub async fn handle_update_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>> {
    Ok(Json(state.services.event_service.update(&user, event_id, request).await?))
}

/// DELETE /api/events/:id
pub async fn handle_delete_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<StatusCode> {
    state.services.event_service.delete(&user, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
