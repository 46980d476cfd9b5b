//! HTTP handlers module
//!
//! This module contains the REST API handlers organized by resource and the
//! router that wires them together:
//! - Auth and user profile handlers
//! - Event, comment and participation handlers
//! - Notification inbox and admin handlers

pub mod admin;
pub mod auth;
pub mod comments;
pub mod events;
pub mod health;
pub mod notifications;
pub mod participation;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;
use crate::middleware::{limit_auth_requests, trace_layer};
use crate::services::image_host::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Multipart framing allowance on top of the image itself
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::handle_register))
        .route("/login", post(auth::handle_login))
        .route_layer(middleware::from_fn_with_state(state.clone(), limit_auth_requests))
        .route("/logout", post(auth::handle_logout))
        .route("/me", get(auth::handle_me));

    let user_routes = Router::new()
        .route("/search", get(users::handle_search))
        .route("/me", put(users::handle_update_me).delete(users::handle_delete_me))
        .route("/me/password", put(users::handle_change_password))
        .route(
            "/me/avatar",
            post(users::handle_upload_avatar).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + UPLOAD_OVERHEAD_BYTES)),
        )
        .route("/:user_id", get(users::handle_get_user));

    let event_routes = Router::new()
        .route("/", get(events::handle_list_events).post(events::handle_create_event))
        .route("/mine", get(events::handle_my_events))
        .route("/attending", get(events::handle_attending_events))
        .route(
            "/:event_id",
            get(events::handle_get_event)
                .put(events::handle_update_event)
                .delete(events::handle_delete_event),
        )
        .route(
            "/:event_id/comments",
            get(comments::handle_list_comments).post(comments::handle_create_comment),
        )
        .route("/:event_id/comments/:comment_id", delete(comments::handle_delete_comment))
        .route("/:event_id/request-join", post(participation::handle_request_join))
        .route("/:event_id/requests", get(participation::handle_list_requests))
        .route("/:event_id/requests/:request_id", put(participation::handle_resolve_request))
        .route("/:event_id/invite", post(participation::handle_invite))
        .route("/:event_id/invitations/:invitation_id", put(participation::handle_respond_invitation))
        .route("/:event_id/participants", get(participation::handle_list_participants))
        .route("/:event_id/reminders/pending-invites", post(participation::handle_remind_pending_invites))
        .route("/:event_id/reminders/attendees", post(participation::handle_remind_attendees));

    let notification_routes = Router::new()
        .route("/", get(notifications::handle_list_notifications))
        .route("/unread-count", get(notifications::handle_unread_count))
        .route("/read-all", put(notifications::handle_mark_all_read))
        .route("/:notification_id", delete(notifications::handle_delete_notification))
        .route("/:notification_id/read", put(notifications::handle_mark_read));

    let admin_routes = Router::new()
        .route("/activities", get(admin::handle_activities))
        .route("/stats", get(admin::handle_stats))
        .route("/settings", get(admin::handle_list_settings))
        .route("/settings/:key", put(admin::handle_put_setting));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/events", event_routes)
        .nest("/notifications", notification_routes)
        .nest("/admin", admin_routes)
        .route("/invitations", get(participation::handle_my_invitations))
        .route("/participations", get(participation::handle_my_participations));

    let cors = cors_layer(&state.settings.server.cors_origins);

    Router::new()
        .route("/health", get(health::handle_health))
        .nest("/api", api)
        .layer(ServiceBuilder::new().layer(trace_layer()).layer(cors))
        .with_state(state)
}

/// CORS for the configured front-end origins; credentials allowed for the session cookie
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
