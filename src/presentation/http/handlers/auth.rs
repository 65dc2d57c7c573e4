//! Authentication Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::request::{LoginRequest, SignupRequest};
use crate::application::dto::response::AuthResponse;
use crate::application::services::{AuthService, AuthServiceImpl, SignupInput};
use crate::infrastructure::repositories::PgUserRepository;
use crate::presentation::http::ValidatedJson;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn auth_service(state: &AppState) -> AuthServiceImpl<PgUserRepository> {
    AuthServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.snowflake.clone(),
        state.settings.jwt.clone(),
    )
}

/// Register a new user
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let input = SignupInput {
        name: body.name,
        email: body.email,
        username: body.username,
        password: body.password,
    };

    let (user, token) = auth_service(&state).signup(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("User created successfully", user, token)),
    ))
}

/// Login with username and password
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (user, token) = auth_service(&state)
        .login(&body.username, &body.password)
        .await?;

    Ok(Json(AuthResponse::new("Logged in successfully", user, token)))
}
