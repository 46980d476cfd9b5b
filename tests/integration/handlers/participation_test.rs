//! Join request, invitation and reminder endpoint tests

use axum::http::{Method, StatusCode};
use serde_json::json;
use serial_test::serial;

use crate::fixtures::{EVENING_SOCIAL, LATE_MORNING_CLASS, MORNING_JAM};
use crate::integration::{fixture_event, setup_integration_test};

#[tokio::test]
#[serial]
async fn test_request_join_response_shape() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, _) = ctx.create_user().await;
    let (_, token) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;

    let (status, body) = ctx
        .request(
            Method::POST,
            &format!("/api/events/{}/request-join", event.id),
            Some(&token),
            Some(json!({ "message": "Can I bring my own shoes?" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["_id"].as_i64().is_some());
    assert_eq!(body["status"], "pending");
    assert_eq!(body["event"]["_id"], event.id);
    assert_eq!(body["event"]["title"], event.title.as_str());
    assert_eq!(body["message"], "Join request sent successfully");
    assert_eq!(ctx.database.count_notifications(organizer.id, "joinRequest").await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_request_join_without_body() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, _) = ctx.create_user().await;
    let (_, token) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;

    let (status, _) = ctx
        .request(Method::POST, &format!("/api/events/{}/request-join", event.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
#[serial]
async fn test_request_join_rejects_malformed_body() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, _) = ctx.create_user().await;
    let (_, token) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;
    let uri = format!("/api/events/{}/request-join", event.id);

    let (status, body) = ctx.request_raw(Method::POST, &uri, Some(&token), "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = ctx.request(Method::POST, &uri, Some(&token), Some(json!({ "message": 42 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.database.count_records("participations").await.unwrap(), 0);
    assert_eq!(ctx.database.count_records("notifications").await.unwrap(), 0);

    let (status, _) = ctx.request_raw(Method::POST, &uri, Some(&token), "").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
#[serial]
async fn test_request_join_errors() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, organizer_token) = ctx.create_user().await;
    let (_, token) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;
    let uri = format!("/api/events/{}/request-join", event.id);

    let (status, _) = ctx.request(Method::POST, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = ctx.request(Method::POST, "/api/events/999999/request-join", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = ctx.request(Method::POST, &uri, Some(&organizer_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, first) = ctx.request(Method::POST, &uri, Some(&token), None).await;
    let (status, body) = ctx.request(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_PARTICIPATION");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["participationId"], first["_id"]);
}

#[tokio::test]
#[serial]
async fn test_scheduling_conflict_body_lists_conflicts() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, _) = ctx.create_user().await;
    let (alice, alice_token) = ctx.create_user().await;
    let own = fixture_event(&ctx, &alice, MORNING_JAM, 10).await;
    let class = fixture_event(&ctx, &organizer, LATE_MORNING_CLASS, 10).await;

    let (status, body) = ctx
        .request(Method::POST, &format!("/api/events/{}/request-join", class.id), Some(&alice_token), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SCHEDULING_CONFLICT");
    let conflicts = body["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["eventId"], own.id);
    assert_eq!(conflicts[0]["role"], "Organizer");
    assert_eq!(ctx.database.count_records("participations").await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_organizer_resolves_requests() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, organizer_token) = ctx.create_user().await;
    let (alice, alice_token) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;

    let (_, body) = ctx
        .request(Method::POST, &format!("/api/events/{}/request-join", event.id), Some(&alice_token), None)
        .await;
    let request_id = body["_id"].as_i64().unwrap();

    let (status, body) = ctx
        .request(Method::GET, &format!("/api/events/{}/requests", event.id), Some(&organizer_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["_id"], request_id);
    assert_eq!(body[0]["eventId"], event.id);
    assert_eq!(body[0]["kind"], "request");
    assert_eq!(body[0]["user"]["id"], alice.id);

    let uri = format!("/api/events/{}/requests/{}", event.id, request_id);
    let (status, _) = ctx.request(Method::PUT, &uri, Some(&alice_token), Some(json!({ "action": "approve" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.request(Method::PUT, &uri, Some(&organizer_token), Some(json!({ "action": "maybe" }))).await;
    assert!(status.is_client_error());

    let (status, body) = ctx
        .request(Method::PUT, &uri, Some(&organizer_token), Some(json!({ "action": "approve" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requestId"], request_id);
    assert_eq!(body["status"], "approved");
    assert_eq!(ctx.database.attendee_count(event.id).await.unwrap(), 1);

    let (status, body) = ctx
        .request(Method::PUT, &uri, Some(&organizer_token), Some(json!({ "action": "decline" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_STATE");

    let (status, body) = ctx
        .request(Method::GET, &format!("/api/events/{}/participants", event.id), Some(&alice_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], alice.id);

    let (_, body) = ctx.request(Method::GET, "/api/participations?status=approved", Some(&alice_token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["event"]["id"], event.id);
}

#[tokio::test]
#[serial]
async fn test_invitation_flow() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, organizer_token) = ctx.create_user().await;
    let (bob, bob_token) = ctx.create_user().await;
    let (_, carol_token) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;

    let (status, body) = ctx
        .request(
            Method::POST,
            &format!("/api/events/{}/invite", event.id),
            Some(&organizer_token),
            Some(json!({ "userId": bob.id, "message": "We need a lead" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "invited");
    assert_eq!(body["kind"], "invitation");
    assert_eq!(body["invitedBy"], organizer.id);
    assert_eq!(body["eventId"], event.id);
    assert_eq!(body["userId"], bob.id);
    assert!(body.get("event_id").is_none());
    let invitation_id = body["_id"].as_i64().unwrap();

    let (_, body) = ctx.request(Method::GET, "/api/invitations", Some(&bob_token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["_id"], invitation_id);
    assert_eq!(body[0]["event"]["title"], event.title.as_str());

    let uri = format!("/api/events/{}/invitations/{}", event.id, invitation_id);
    let (status, _) = ctx.request(Method::PUT, &uri, Some(&carol_token), Some(json!({ "action": "accept" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.request(Method::PUT, &uri, Some(&bob_token), Some(json!({ "action": "accept" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invitationId"], invitation_id);
    assert_eq!(body["status"], "approved");
    assert_eq!(ctx.database.count_notifications(organizer.id, "invitationAccepted").await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_reminder_endpoints() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, organizer_token) = ctx.create_user().await;
    let (alice, alice_token) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;
    ctx.services().participation_service.invite(&organizer, event.id, alice.id, None).await.unwrap();

    let (status, body) = ctx
        .request(Method::POST, &format!("/api/events/{}/reminders/pending-invites", event.id), Some(&organizer_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);

    let (status, body) = ctx
        .request(Method::POST, &format!("/api/events/{}/reminders/attendees", event.id), Some(&organizer_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let (status, _) = ctx
        .request(Method::POST, &format!("/api/events/{}/reminders/attendees", event.id), Some(&alice_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
