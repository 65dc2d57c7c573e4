//! Room Handlers
//!
//! Direct-message rooms and their messages.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreateMessageRequest, CreateRoomRequest};
use crate::application::dto::response::{
    ConversationResponse, CreatedMessageResponse, LastMessageResponse, RoomEnvelope,
    RoomListResponse, RoomMessagesResponse, UnreadCountResponse,
};
use crate::application::services::{RoomService, RoomServiceImpl};
use crate::infrastructure::repositories::{PgMessageRepository, PgRoomRepository, PgUserRepository};
use crate::presentation::http::ValidatedJson;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

type PgRoomService = RoomServiceImpl<PgRoomRepository, PgMessageRepository, PgUserRepository>;

fn room_service(state: &AppState) -> PgRoomService {
    RoomServiceImpl::new(
        Arc::new(PgRoomRepository::new(state.db.clone())),
        Arc::new(PgMessageRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

/// Find or create the room of two users
pub async fn create_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<CreateRoomRequest>,
) -> Result<Json<RoomEnvelope>, AppError> {
    let user1_id = body.user1_id.parse("user")?;
    let user2_id = body.user2_id.parse("user")?;

    let room = room_service(&state)
        .create_room(auth.user_id, user1_id, user2_id)
        .await?;

    Ok(Json(RoomEnvelope { room_id: room.into() }))
}

pub async fn list_rooms(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<RoomListResponse>, AppError> {
    let rooms = room_service(&state).list_rooms(auth.user_id).await?;

    Ok(Json(RoomListResponse {
        rooms: rooms.into_iter().map(Into::into).collect(),
    }))
}

pub async fn create_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CreateMessageRequest>,
) -> Result<(StatusCode, Json<CreatedMessageResponse>), AppError> {
    let room_id = parse_id(&room_id, "room")?;
    let message = room_service(&state)
        .create_message(auth.user_id, room_id, &body.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedMessageResponse {
            message: "Message sent successfully",
            data: message.into(),
        }),
    ))
}

pub async fn get_room_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomMessagesResponse>, AppError> {
    let room_id = parse_id(&room_id, "room")?;
    let (room, messages) = room_service(&state)
        .room_messages(auth.user_id, room_id)
        .await?;

    Ok(Json(RoomMessagesResponse {
        room: room.into(),
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}

/// Conversation between two users; marks the caller's incoming messages seen
pub async fn get_messages_between(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((sender_id, receiver_id)): Path<(String, String)>,
) -> Result<Json<ConversationResponse>, AppError> {
    let sender_id = parse_id(&sender_id, "sender")?;
    let receiver_id = parse_id(&receiver_id, "receiver")?;

    let messages = room_service(&state)
        .messages_between(auth.user_id, sender_id, receiver_id)
        .await?;

    Ok(Json(ConversationResponse {
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}

pub async fn get_last_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((a, b)): Path<(String, String)>,
) -> Result<Json<LastMessageResponse>, AppError> {
    let a = parse_id(&a, "user")?;
    let b = parse_id(&b, "user")?;

    let last = room_service(&state).last_message(auth.user_id, a, b).await?;

    Ok(Json(LastMessageResponse {
        last_message: last.map(Into::into),
    }))
}

pub async fn get_unread_messages_count(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    let count = room_service(&state).unread_count(auth.user_id, user_id).await?;

    Ok(Json(UnreadCountResponse {
        unread_messages_count: count,
    }))
}
