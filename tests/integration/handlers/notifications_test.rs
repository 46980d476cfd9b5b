//! Notification inbox endpoint tests

use axum::http::{Method, StatusCode};
use serial_test::serial;

use crate::fixtures::EVENING_SOCIAL;
use crate::integration::{fixture_event, setup_integration_test};

#[tokio::test]
#[serial]
async fn test_inbox_lifecycle() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, organizer_token) = ctx.create_user().await;
    let (alice, _) = ctx.create_user().await;
    let (bob, _) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;
    let participation = &ctx.services().participation_service;
    participation.submit_join_request(&alice, event.id, None).await.unwrap();
    participation.submit_join_request(&bob, event.id, None).await.unwrap();

    let (status, body) = ctx.request(Method::GET, "/api/notifications", Some(&organizer_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let inbox = body.as_array().unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0]["type"], "joinRequest");
    assert_eq!(inbox[0]["is_read"], false);
    let first = inbox[0]["id"].as_i64().unwrap();

    let (_, body) = ctx.request(Method::GET, "/api/notifications/unread-count", Some(&organizer_token), None).await;
    assert_eq!(body["count"], 2);

    let (status, body) = ctx
        .request(Method::PUT, &format!("/api/notifications/{}/read", first), Some(&organizer_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_read"], true);

    let (_, body) = ctx.request(Method::GET, "/api/notifications?unread=true", Some(&organizer_token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = ctx.request(Method::PUT, "/api/notifications/read-all", Some(&organizer_token), None).await;
    assert_eq!(body["updated"], 1);
    let (_, body) = ctx.request(Method::GET, "/api/notifications/unread-count", Some(&organizer_token), None).await;
    assert_eq!(body["count"], 0);

    let uri = format!("/api/notifications/{}", first);
    let (status, _) = ctx.request(Method::DELETE, &uri, Some(&organizer_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = ctx.request(Method::DELETE, &uri, Some(&organizer_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_notifications_are_private_to_their_recipient() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, organizer_token) = ctx.create_user().await;
    let (alice, alice_token) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;
    ctx.services().participation_service.submit_join_request(&alice, event.id, None).await.unwrap();

    let (_, body) = ctx.request(Method::GET, "/api/notifications", Some(&organizer_token), None).await;
    let id = body[0]["id"].as_i64().unwrap();

    let (status, _) = ctx
        .request(Method::PUT, &format!("/api/notifications/{}/read", id), Some(&alice_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.request(Method::DELETE, &format!("/api/notifications/{}", id), Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = ctx.request(Method::GET, "/api/notifications", Some(&alice_token), None).await;
    assert!(body.as_array().unwrap().is_empty());
}
