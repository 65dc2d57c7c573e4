//! Saved Post Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::application::dto::response::{
    MessageResponse, SavedPostEnvelope, SavedPostListResponse, SavedPostRecordResponse,
    STATUS_SUCCESS,
};
use crate::application::services::{SavedPostService, SavedPostServiceImpl};
use crate::infrastructure::repositories::{PgPostRepository, PgSavedPostRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

fn saved_post_service(state: &AppState) -> SavedPostServiceImpl<PgSavedPostRepository, PgPostRepository> {
    SavedPostServiceImpl::new(
        Arc::new(PgSavedPostRepository::new(state.db.clone())),
        Arc::new(PgPostRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

pub async fn get_saved_posts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<SavedPostListResponse>, AppError> {
    let saved = saved_post_service(&state).list_saved(auth.user_id).await?;

    Ok(Json(SavedPostListResponse {
        status: STATUS_SUCCESS,
        saved_posts: saved.into_iter().map(Into::into).collect(),
    }))
}

pub async fn save_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<SavedPostEnvelope>, AppError> {
    let post_id = parse_id(&post_id, "post")?;
    let saved = saved_post_service(&state).save(auth.user_id, post_id).await?;

    Ok(Json(SavedPostEnvelope {
        status: STATUS_SUCCESS,
        saved_post: SavedPostRecordResponse {
            id: saved.id.to_string(),
            user: saved.user_id.to_string(),
            post: saved.post_id.to_string(),
            created_at: saved.created_at.to_rfc3339(),
        },
    }))
}

pub async fn unsave_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let post_id = parse_id(&post_id, "post")?;
    saved_post_service(&state).unsave(auth.user_id, post_id).await?;

    Ok(Json(MessageResponse::success("Post removed from saved posts")))
}
