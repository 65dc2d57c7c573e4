//! Post Handlers
//!
//! Posts, the feed and likes.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreatePostRequest, PostQueryParams};
use crate::application::dto::response::{
    MessageResponse, PostDetailResponse, PostEnvelope, PostListResponse, PostResponse,
};
use crate::application::services::{PostService, PostServiceImpl};
use crate::infrastructure::repositories::{PgCommentRepository, PgPostRepository, PgUserRepository};
use crate::presentation::http::ValidatedJson;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

type PgPostService = PostServiceImpl<PgPostRepository, PgUserRepository, PgCommentRepository>;

fn post_service(state: &AppState) -> PgPostService {
    PostServiceImpl::new(
        Arc::new(PgPostRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgCommentRepository::new(state.db.clone())),
        state.notifications.clone(),
        state.snowflake.clone(),
    )
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostEnvelope<PostResponse>>), AppError> {
    let post = post_service(&state)
        .create_post(auth.user_id, body.image, body.caption)
        .await?;

    Ok((StatusCode::CREATED, Json(PostEnvelope::new(post.into()))))
}

/// Global feed, newest first. `before` pages by post id.
pub async fn get_all_posts(
    State(state): State<AppState>,
    Query(params): Query<PostQueryParams>,
) -> Result<Json<PostListResponse>, AppError> {
    let before = params
        .before
        .as_deref()
        .map(|raw| parse_id(raw, "post"))
        .transpose()?;

    let posts = post_service(&state).list_posts(before, params.limit).await?;

    Ok(Json(PostListResponse::new(posts)))
}

pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PostListResponse>, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    let posts = post_service(&state).list_user_posts(user_id).await?;

    Ok(Json(PostListResponse::new(posts)))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<PostEnvelope<PostDetailResponse>>, AppError> {
    let post_id = parse_id(&post_id, "post")?;
    let detail = post_service(&state).get_post(post_id).await?;

    Ok(Json(PostEnvelope::new(detail.into())))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let post_id = parse_id(&post_id, "post")?;
    post_service(&state).delete_post(auth.user_id, post_id).await?;

    Ok(Json(MessageResponse::success("Post deleted successfully")))
}

pub async fn like_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<PostEnvelope<PostResponse>>, AppError> {
    let post_id = parse_id(&post_id, "post")?;
    let post = post_service(&state).like(auth.user_id, post_id).await?;

    Ok(Json(PostEnvelope::new(post.into())))
}

pub async fn dislike_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<PostEnvelope<PostResponse>>, AppError> {
    let post_id = parse_id(&post_id, "post")?;
    let post = post_service(&state).dislike(auth.user_id, post_id).await?;

    Ok(Json(PostEnvelope::new(post.into())))
}
