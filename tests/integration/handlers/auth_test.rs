//! Auth and user endpoint tests

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use serial_test::serial;
use tower::ServiceExt;

use crate::helpers::{send, TEST_PASSWORD};
use crate::integration::setup_integration_test;

#[tokio::test]
#[serial]
async fn test_register_sets_session_cookie() {
    let Some(ctx) = setup_integration_test().await else { return };

    let (status, cookie, body) = send(
        ctx.router(),
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Frankie Manning",
            "username": "frankie",
            "email": "frankie@example.com",
            "password": TEST_PASSWORD,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let cookie = cookie.expect("session cookie");
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert_eq!(body["username"], "frankie");
    assert_eq!(body["status"], "online");
    assert!(body.get("password_hash").is_none());
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
#[serial]
async fn test_session_cookie_authenticates() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (alice, token) = ctx.create_user().await;

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, format!("theme=dark; token={}", token))
        .body(Body::empty())
        .unwrap();
    let response = ctx.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = ctx.request(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], alice.id);
}

#[tokio::test]
#[serial]
async fn test_missing_or_bad_token_is_unauthorized() {
    let Some(ctx) = setup_integration_test().await else { return };

    let (status, body) = ctx.request(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = ctx.request(Method::GET, "/api/events", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_login_and_logout() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (alice, _) = ctx.create_user().await;

    let (status, _, _) = send(
        ctx.router(),
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "login": alice.username, "password": "nope-nope-nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, cookie, body) = send(
        ctx.router(),
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "login": alice.email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.is_some());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, cookie, _) = send(ctx.router(), Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.unwrap().contains("Max-Age=0"));

    let (_, body) = ctx.request(Method::GET, &format!("/api/users/{}", alice.id), Some(&token), None).await;
    assert_eq!(body["status"], "offline");
}

#[tokio::test]
#[serial]
async fn test_user_search_and_profile_update() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (alice, token) = ctx.create_user().await;
    let (bob, _) = ctx.create_user().await;

    let (status, body) = ctx
        .request(Method::GET, &format!("/api/users/search?q={}", bob.username), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let found = body.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], bob.id);
    assert!(found[0].get("email").is_none());

    let (status, body) = ctx
        .request(Method::PUT, "/api/users/me", Some(&token), Some(json!({ "name": "Alice Cooper" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alice Cooper");
    assert_eq!(body["id"], alice.id);

    let (status, body) = ctx.request(Method::PUT, "/api/users/me", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
#[serial]
async fn test_delete_account_clears_cookie() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (_, token) = ctx.create_user().await;

    let (status, cookie, _) = send(ctx.router(), Method::DELETE, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(cookie.unwrap().contains("Max-Age=0"));

    let (status, _) = ctx.request(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
