//! Notification Handlers

use axum::{
    extract::{Extension, State},
    Json,
};

use crate::application::dto::response::{
    MarkSeenResponse, NotificationListResponse, NotificationResponse, STATUS_SUCCESS,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Notifications of the current user, newest first
pub async fn get_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let notifications = state.notifications.list(auth.user_id).await?;

    Ok(Json(NotificationListResponse {
        status: STATUS_SUCCESS,
        notifications: notifications.iter().map(NotificationResponse::from).collect(),
    }))
}

pub async fn mark_notifications_as_seen(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MarkSeenResponse>, AppError> {
    let updated = state.notifications.mark_all_seen(auth.user_id).await?;

    Ok(Json(MarkSeenResponse {
        status: STATUS_SUCCESS,
        message: "Notifications marked as seen",
        updated,
    }))
}
