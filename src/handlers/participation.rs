//! Participation handlers
//!
//! Join requests, invitations and reminders. Participation bodies use `_id`
//! and camelCase keys; embedded events and users keep their own shape.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use crate::middleware::AuthUser;
use crate::models::{
    InvitationAction, Participation, ParticipationDetails, ParticipationStatus, PublicUser, ReminderTarget,
    RequestAction, User,
};
use crate::state::AppState;
use crate::utils::errors::{EventHubError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct JoinRequestBody {
    pub message: Option<String>,
}

impl JoinRequestBody {
    /// An empty body means no message; anything else must be valid JSON
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(raw)
            .map_err(|e| EventHubError::Validation(format!("Invalid request body: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequestBody {
    pub action: RequestAction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteBody {
    pub user_id: i64,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RespondInvitationBody {
    pub action: InvitationAction,
}

#[derive(Debug, Default, Deserialize)]
pub struct ParticipationQuery {
    pub status: Option<ParticipationStatus>,
}

#[derive(Debug, Serialize)]
pub struct EventRef {
    #[serde(rename = "_id")]
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct JoinRequestResponse {
    #[serde(rename = "_id")]
    pub id: i64,
    pub status: ParticipationStatus,
    pub event: EventRef,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResolvedResponse {
    pub request_id: i64,
    pub status: ParticipationStatus,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationAnsweredResponse {
    pub invitation_id: i64,
    pub status: ParticipationStatus,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub success: bool,
    pub message: String,
    pub count: u64,
}

/// POST /api/events/:event_id/request-join
pub async fn handle_request_join(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
    raw: Bytes,
) -> Result<(StatusCode, Json<JoinRequestResponse>)> {
    let body = JoinRequestBody::parse(&raw)?;
    let outcome = state.services.participation_service
        .submit_join_request(&user, event_id, body.message)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(JoinRequestResponse {
            id: outcome.participation.id,
            status: outcome.participation.status,
            event: EventRef { id: outcome.event.id, title: outcome.event.title },
            message: "Join request sent successfully".to_string(),
        }),
    ))
}

/// GET /api/events/:event_id/requests
pub async fn handle_list_requests(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<ParticipationDetails>>> {
    Ok(Json(state.services.participation_service.list_pending_requests(&user, event_id).await?))
}

/// PUT /api/events/:event_id/requests/:request_id
pub async fn handle_resolve_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((event_id, request_id)): Path<(i64, i64)>,
    Json(body): Json<ResolveRequestBody>,
) -> Result<Json<RequestResolvedResponse>> {
    let participation = state.services.participation_service
        .resolve_join_request(&user, event_id, request_id, body.action)
        .await?;

    let message = match body.action {
        RequestAction::Approve => "Request approved",
        RequestAction::Decline => "Request declined",
    };
    Ok(Json(RequestResolvedResponse {
        request_id: participation.id,
        status: participation.status,
        message: message.to_string(),
    }))
}

/// POST /api/events/:event_id/invite
pub async fn handle_invite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
    Json(body): Json<InviteBody>,
) -> Result<(StatusCode, Json<Participation>)> {
    let invitation = state.services.participation_service
        .invite(&user, event_id, body.user_id, body.message)
        .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// PUT /api/events/:event_id/invitations/:invitation_id
pub async fn handle_respond_invitation(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((event_id, invitation_id)): Path<(i64, i64)>,
    Json(body): Json<RespondInvitationBody>,
) -> Result<Json<InvitationAnsweredResponse>> {
    let participation = state.services.participation_service
        .respond_to_invitation(&user, event_id, invitation_id, body.action)
        .await?;

    let message = match body.action {
        InvitationAction::Accept => "Invitation accepted",
        InvitationAction::Decline => "Invitation declined",
    };
    Ok(Json(InvitationAnsweredResponse {
        invitation_id: participation.id,
        status: participation.status,
        message: message.to_string(),
    }))
}

/// GET /api/events/:event_id/participants
pub async fn handle_list_participants(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<PublicUser>>> {
    Ok(Json(state.services.participation_service.list_participants(&user, event_id).await?))
}

/// GET /api/invitations
pub async fn handle_my_invitations(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ParticipationDetails>>> {
    Ok(Json(state.services.participation_service.list_invitations(&user).await?))
}

/// GET /api/participations
pub async fn handle_my_participations(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<ParticipationQuery>,
) -> Result<Json<Vec<ParticipationDetails>>> {
    Ok(Json(state.services.participation_service.list_participations(&user, query.status).await?))
}

/// POST /api/events/:event_id/reminders/pending-invites
pub async fn handle_remind_pending_invites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Json<ReminderResponse>> {
    send_reminders(&state, &user, event_id, ReminderTarget::PendingInvitees).await
}

/// POST /api/events/:event_id/reminders/attendees
pub async fn handle_remind_attendees(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Json<ReminderResponse>> {
    send_reminders(&state, &user, event_id, ReminderTarget::ApprovedAttendees).await
}

async fn send_reminders(
    state: &AppState,
    user: &User,
    event_id: i64,
    target: ReminderTarget,
) -> Result<Json<ReminderResponse>> {
    let count = state.services.participation_service.send_reminders(user, event_id, target).await?;
    let audience = match target {
        ReminderTarget::PendingInvitees => "pending invitee",
        ReminderTarget::ApprovedAttendees => "attendee",
    };

    Ok(Json(ReminderResponse {
        success: true,
        message: format!("Reminder sent to {} {}(s)", count, audience),
        count,
    }))
}
