//! Room and Notification API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_rooms_require_auth() {
    let app = TestApp::new();

    let response = app.get("/api/v1/room").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_room_with_bad_user_id() {
    let app = TestApp::new();
    let token = app.token_for(1);

    let body = json!({"user1Id": "1", "user2Id": "abc"});
    let response = app
        .post_json_auth("/api/v1/room/create", &body.to_string(), &token)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid user ID");
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let app = TestApp::new();
    let token = app.token_for(1);

    let response = app
        .post_json_auth("/api/v1/room/55/createMessage", r#"{"content": ""}"#, &token)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_conversation_with_bad_ids() {
    let app = TestApp::new();
    let token = app.token_for(1);

    let response = app.get_auth("/api/v1/room/1/someone", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid receiver ID");
}

#[tokio::test]
async fn test_unread_count_with_bad_id() {
    let app = TestApp::new();
    let token = app.token_for(1);

    let response = app.get_auth("/api/v1/room/unread-messages/zero", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notifications_require_auth() {
    let server = TestApp::new().server();

    server
        .post("/api/v1/notifications/mark-notification-as-seen")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
