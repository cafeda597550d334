//! End-to-end HTTP tests against an in-memory SQLite store.
//!
//! Drives the full stack (router, middleware, services, store) through
//! tower's `oneshot` without binding a socket.
//!
//! Requires the `sqlite` feature flag.

#![cfg(all(feature = "sqlite", not(feature = "postgres")))]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use spiderpay_hex::{HttpServer, PaymentService, TokenIssuer, UserService};
use spiderpay_repo::SqliteStore;

const TEST_SECRET: &[u8] = b"integration-test-secret";

async fn test_router() -> Router {
    let store = Arc::new(SqliteStore::new("sqlite::memory:").await.unwrap());
    HttpServer::new(
        UserService::new(store.clone()),
        PaymentService::new(store, "mock".to_string()),
        TokenIssuer::with_default_ttl(TEST_SECRET),
    )
    .router()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers a user and returns a bearer token for it.
async fn register_and_login(router: &Router, email: &str) -> String {
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/users",
            None,
            json!({ "email": email, "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": email, "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = test_router().await;

    let response = router.oneshot(get_request("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_register_login_and_payment_flow() {
    let router = test_router().await;
    let token = register_and_login(&router, "alice@example.com").await;

    // Create a payment as the authenticated user.
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/payments",
            Some(&token),
            json!({ "amount": 1050, "currency": "USD", "description": "coffee" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let payment = body_json(response).await;
    assert_eq!(payment["status"], "PENDING");
    assert_eq!(payment["amount"], 1050);
    assert_eq!(payment["currency"], "USD");
    assert_eq!(payment["gateway"], "mock");
    let payment_id = payment["id"].as_str().unwrap().to_string();

    // The owner can read it back.
    let response = router
        .clone()
        .oneshot(get_request(&format!("/payments/{}", payment_id), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Patch the description.
    let response = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/payments/{}", payment_id),
            Some(&token),
            json!({ "description": "espresso" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let patched = body_json(response).await;
    assert_eq!(patched["description"], "espresso");
    assert_eq!(patched["status"], "PENDING");

    // And it shows up in the listing.
    let response = router
        .clone()
        .oneshot(get_request("/payments", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_payments_require_bearer_token() {
    let router = test_router().await;

    let response = router
        .clone()
        .oneshot(get_request("/payments", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], 401);

    let response = router
        .oneshot(get_request("/payments", Some("not-a-real-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stranger_cannot_read_others_payment() {
    let router = test_router().await;
    let owner_token = register_and_login(&router, "owner@example.com").await;
    let stranger_token = register_and_login(&router, "stranger@example.com").await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/payments",
            Some(&owner_token),
            json!({ "amount": 500, "currency": "EUR" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let payment_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = router
        .oneshot(get_request(
            &format!("/payments/{}", payment_id),
            Some(&stranger_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let router = test_router().await;
    register_and_login(&router, "dup@example.com").await;

    let response = router
        .oneshot(json_request(
            "POST",
            "/users",
            None,
            json!({ "email": "dup@example.com", "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], 409);
}

#[tokio::test]
async fn test_invalid_payment_request_rejected() {
    let router = test_router().await;
    let token = register_and_login(&router, "val@example.com").await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/payments",
            Some(&token),
            json!({ "amount": 0, "currency": "USD" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was persisted for the rejected request.
    let response = router
        .oneshot(get_request("/payments", Some(&token)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_deleted_user_token_stops_working() {
    let router = test_router().await;
    let token = register_and_login(&router, "gone@example.com").await;

    let response = router
        .clone()
        .oneshot(get_request("/users", None))
        .await
        .unwrap();
    let users = body_json(response).await;
    let user_id = users.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/users/{}", user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(get_request("/payments", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rate_limit_kicks_in() {
    let store = Arc::new(SqliteStore::new("sqlite::memory:").await.unwrap());
    let router = HttpServer::with_rate_limit(
        UserService::new(store.clone()),
        PaymentService::new(store, "mock".to_string()),
        TokenIssuer::with_default_ttl(TEST_SECRET),
        2,
    )
    .router();

    // Registration and login use up both anonymous slots.
    let token = register_and_login(&router, "limited@example.com").await;

    let response = router
        .clone()
        .oneshot(get_request("/users", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["retry_after_seconds"], 60);

    // A forged token bills the anonymous bucket, it does not mint one.
    let response = router
        .clone()
        .oneshot(get_request("/users", Some("not-a-real-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // The authenticated user has their own untouched bucket.
    let response = router
        .clone()
        .oneshot(get_request("/payments", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Health stays reachable even when the caller is limited.
    let response = router.oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
