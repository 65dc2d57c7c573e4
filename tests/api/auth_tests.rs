//! Authentication API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

use crate::common::{body_json, TestApp};

#[test_case(json!({"name": "Ann", "email": "not-an-email", "username": "ann", "password": "long enough"}) ; "invalid email")]
#[test_case(json!({"name": "Ann", "email": "ann@example.com", "username": "ann", "password": "short"}) ; "short password")]
#[test_case(json!({"name": "", "email": "ann@example.com", "username": "ann", "password": "long enough"}) ; "empty name")]
#[tokio::test]
async fn test_signup_rejects_invalid_body(body: serde_json::Value) {
    let app = TestApp::new();

    let response = app.post_json("/api/v1/users/signup", &body.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 10007);
}

#[tokio::test]
async fn test_signup_rejects_malformed_json() {
    let app = TestApp::new();

    let response = app.post_json("/api/v1/users/signup", "{not json").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 10002);
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let server = TestApp::new().server();

    let response = server
        .post("/api/v1/users/login")
        .json(&json!({"username": "", "password": "secret"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_endpoint_requires_auth() {
    let app = TestApp::new();

    let response = app.get("/api/v1/users/me").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["message"],
        "You are not logged in. Please log in to get access"
    );
}

#[tokio::test]
async fn test_protected_endpoint_rejects_forged_token() {
    let app = TestApp::new();

    let response = app.get_auth("/api/v1/users/me", "not.a.token").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_user_id_is_bad_request() {
    let app = TestApp::new();
    let token = app.token_for(42);

    let response = app.get_auth("/api/v1/users/abc", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid user ID");
}
