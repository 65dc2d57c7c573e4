//! User Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::application::dto::response::{
    MessageResponse, UserEnvelope, UserListResponse, UserResponse, STATUS_SUCCESS,
};
use crate::application::services::{UserService, UserServiceImpl};
use crate::infrastructure::repositories::PgUserRepository;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

fn user_service(state: &AppState) -> UserServiceImpl<PgUserRepository> {
    UserServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.notifications.clone(),
    )
}

/// Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserEnvelope>, AppError> {
    let profile = user_service(&state).get_profile(auth.user_id).await?;

    Ok(Json(UserEnvelope {
        status: STATUS_SUCCESS,
        user: UserResponse::from_profile(profile, true),
    }))
}

/// Get a user by ID. Email is only shown to the user themselves.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserEnvelope>, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    let profile = user_service(&state).get_profile(user_id).await?;

    Ok(Json(UserEnvelope {
        status: STATUS_SUCCESS,
        user: UserResponse::from_profile(profile, user_id == auth.user_id),
    }))
}

pub async fn follow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(target_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let target_id = parse_id(&target_id, "user")?;
    user_service(&state).follow(auth.user_id, target_id).await?;

    Ok(Json(MessageResponse::success("User followed successfully")))
}

pub async fn unfollow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(target_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let target_id = parse_id(&target_id, "user")?;
    user_service(&state).unfollow(auth.user_id, target_id).await?;

    Ok(Json(MessageResponse::success("User unfollowed successfully")))
}

pub async fn followers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserListResponse>, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    let users = user_service(&state).followers(user_id).await?;

    Ok(Json(UserListResponse::new(users)))
}

pub async fn following(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserListResponse>, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    let users = user_service(&state).following(user_id).await?;

    Ok(Json(UserListResponse::new(users)))
}
