//! Post, Comment and Saved Post API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_create_post_requires_auth() {
    let app = TestApp::new();

    let response = app.post_json("/api/v1/posts", r#"{"caption": "hi"}"#).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_post_without_image_or_caption() {
    let app = TestApp::new();
    let token = app.token_for(7);

    let response = app
        .post_json_auth("/api/v1/posts", r#"{"caption": "   "}"#, &token)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_post_with_bad_id() {
    let app = TestApp::new();

    let response = app.get("/api/v1/posts/not-a-number").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid post ID");
}

#[tokio::test]
async fn test_feed_cursor_must_be_an_id() {
    let app = TestApp::new();

    let response = app.get("/api/v1/posts?before=yesterday").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_comment_rejected() {
    let server = TestApp::new().server();
    let token = TestApp::new().token_for(7);

    let response = server
        .post("/api/v1/posts/comment/123")
        .authorization_bearer(&token)
        .json(&json!({"comment": ""}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_comment_with_bad_comment_id() {
    let server = TestApp::new().server();
    let token = TestApp::new().token_for(7);

    let response = server
        .delete("/api/v1/posts/123/comments/abc")
        .authorization_bearer(&token)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<serde_json::Value>()["message"], "Invalid comment ID");
}

#[tokio::test]
async fn test_saved_posts_require_auth() {
    let server = TestApp::new().server();

    server
        .get("/api/v1/savedposts")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unsave_with_bad_post_id() {
    let server = TestApp::new().server();
    let token = TestApp::new().token_for(7);

    server
        .delete("/api/v1/savedposts/unsave/xyz")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
