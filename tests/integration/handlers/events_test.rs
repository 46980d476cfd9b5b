//! Event and comment endpoint tests

use axum::http::{Method, StatusCode};
use serde_json::json;
use serial_test::serial;

use crate::fixtures::{DAY, MORNING_JAM};
use crate::integration::{fixture_event, setup_integration_test};

#[tokio::test]
#[serial]
async fn test_create_and_fetch_event() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, token) = ctx.create_user().await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/api/events",
            Some(&token),
            Some(json!({
                "title": "Lindy Exchange",
                "start_date": DAY,
                "start_time": "19:00",
                "end_date": DAY,
                "end_time": "23:30",
                "location": "Savoy",
                "type": "social",
                "max_attendees": 40,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["organizer_id"], organizer.id);
    assert_eq!(body["status"], "scheduled");
    assert_eq!(body["cur_attendees"], 0);
    assert_eq!(body["start_time"], "19:00");
    assert_eq!(body["publicity"], true);

    let id = body["id"].as_i64().unwrap();
    let (status, body) = ctx.request(Method::GET, &format!("/api/events/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Lindy Exchange");

    let (status, body) = ctx.request(Method::GET, "/api/events/mine", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_invalid_schedule_is_rejected() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (_, token) = ctx.create_user().await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/api/events",
            Some(&token),
            Some(json!({
                "title": "Backwards",
                "start_date": DAY,
                "start_time": "12:00",
                "end_date": DAY,
                "end_time": "10:00",
                "max_attendees": 5,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
#[serial]
async fn test_private_events_are_hidden_from_outsiders() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, organizer_token) = ctx.create_user().await;
    let (_, outsider_token) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, MORNING_JAM, 5).await;

    let (status, _) = ctx
        .request(Method::PUT, &format!("/api/events/{}", event.id), Some(&organizer_token), Some(json!({ "publicity": false })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.request(Method::GET, &format!("/api/events/{}", event.id), Some(&outsider_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx.request(Method::GET, "/api/events", Some(&outsider_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
#[serial]
async fn test_listing_far_past_the_last_page() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, token) = ctx.create_user().await;
    fixture_event(&ctx, &organizer, MORNING_JAM, 5).await;

    let (status, body) = ctx
        .request(Method::GET, &format!("/api/events?page={}", i64::MAX), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 1);

    let (status, _) = ctx
        .request(Method::GET, &format!("/api/notifications?page={}", i64::MAX), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn test_only_organizer_updates_and_deletes() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, organizer_token) = ctx.create_user().await;
    let (_, other_token) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, MORNING_JAM, 5).await;
    let uri = format!("/api/events/{}", event.id);

    let (status, _) = ctx.request(Method::PUT, &uri, Some(&other_token), Some(json!({ "title": "Mine now" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.request(Method::DELETE, &uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .request(Method::PUT, &uri, Some(&organizer_token), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    // closed events are read-only
    let (status, _) = ctx.request(Method::PUT, &uri, Some(&organizer_token), Some(json!({ "title": "Again" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx.request(Method::DELETE, &uri, Some(&organizer_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = ctx.request(Method::GET, &uri, Some(&organizer_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_comments() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, organizer_token) = ctx.create_user().await;
    let (alice, alice_token) = ctx.create_user().await;
    let (_, bob_token) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, MORNING_JAM, 5).await;
    let uri = format!("/api/events/{}/comments", event.id);

    let (status, body) = ctx
        .request(Method::POST, &uri, Some(&alice_token), Some(json!({ "content": "Is there a beginner lesson?" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = body["id"].as_i64().unwrap();

    let (status, body) = ctx.request(Method::GET, &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["author_username"], alice.username.as_str());

    let (status, _) = ctx
        .request(Method::DELETE, &format!("{}/{}", uri, comment_id), Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .request(Method::DELETE, &format!("{}/{}", uri, comment_id), Some(&organizer_token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.request(Method::POST, &uri, Some(&alice_token), Some(json!({ "content": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
