//! Comment Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::CommentRequest;
use crate::application::dto::response::{
    CommentEnvelope, CommentListResponse, MessageResponse, STATUS_SUCCESS,
};
use crate::application::services::{CommentService, CommentServiceImpl};
use crate::infrastructure::repositories::{PgCommentRepository, PgPostRepository};
use crate::presentation::http::ValidatedJson;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

fn comment_service(state: &AppState) -> CommentServiceImpl<PgCommentRepository, PgPostRepository> {
    CommentServiceImpl::new(
        Arc::new(PgCommentRepository::new(state.db.clone())),
        Arc::new(PgPostRepository::new(state.db.clone())),
        state.notifications.clone(),
        state.snowflake.clone(),
    )
}

/// Comment on a post
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CommentRequest>,
) -> Result<(StatusCode, Json<CommentEnvelope>), AppError> {
    let post_id = parse_id(&post_id, "post")?;
    let comment = comment_service(&state)
        .comment(auth.user_id, post_id, &body.comment)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentEnvelope {
            status: STATUS_SUCCESS,
            comment: comment.into(),
        }),
    ))
}

pub async fn get_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<CommentListResponse>, AppError> {
    let post_id = parse_id(&post_id, "post")?;
    let comments = comment_service(&state).list_comments(post_id).await?;

    Ok(Json(CommentListResponse {
        status: STATUS_SUCCESS,
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let post_id = parse_id(&post_id, "post")?;
    let comment_id = parse_id(&comment_id, "comment")?;

    comment_service(&state)
        .delete_comment(auth.user_id, post_id, comment_id)
        .await?;

    Ok(Json(MessageResponse::success("Comment deleted successfully")))
}
