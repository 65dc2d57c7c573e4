//! Room Service
//!
//! Direct-message rooms between two users and the messages inside them.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Message, MessageRepository, Room, RoomRepository, UserRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Room service trait
#[async_trait]
pub trait RoomService: Send + Sync {
    /// Find or create the room of two users. The caller must be one of them.
    async fn create_room(&self, caller_id: i64, user1_id: i64, user2_id: i64) -> Result<Room, RoomError>;

    async fn list_rooms(&self, caller_id: i64) -> Result<Vec<Room>, RoomError>;

    /// Send a message to the other participant of a room
    async fn create_message(&self, caller_id: i64, room_id: i64, content: &str) -> Result<Message, RoomError>;

    /// Room and its messages, oldest first
    async fn room_messages(&self, caller_id: i64, room_id: i64) -> Result<(Room, Vec<Message>), RoomError>;

    /// Conversation between two users. Messages addressed to the caller are marked seen.
    async fn messages_between(&self, caller_id: i64, sender_id: i64, receiver_id: i64) -> Result<Vec<Message>, RoomError>;

    async fn last_message(&self, caller_id: i64, a: i64, b: i64) -> Result<Option<Message>, RoomError>;

    async fn unread_count(&self, caller_id: i64, user_id: i64) -> Result<i64, RoomError>;
}

/// Room service errors
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("Room not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("A room needs two different users")]
    SameUser,

    #[error("You are not a participant of this conversation")]
    NotParticipant,

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<RoomError> for AppError {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::NotFound | RoomError::UserNotFound => AppError::NotFound(err.to_string()),
            RoomError::SameUser | RoomError::EmptyMessage => AppError::BadRequest(err.to_string()),
            RoomError::NotParticipant => AppError::Forbidden(err.to_string()),
            RoomError::Repository(e) => e,
        }
    }
}

fn ensure_caller_in(caller_id: i64, a: i64, b: i64) -> Result<(), RoomError> {
    if caller_id == a || caller_id == b {
        Ok(())
    } else {
        Err(RoomError::NotParticipant)
    }
}

/// RoomService implementation
pub struct RoomServiceImpl<R, M, U>
where
    R: RoomRepository,
    M: MessageRepository,
    U: UserRepository,
{
    room_repo: Arc<R>,
    message_repo: Arc<M>,
    user_repo: Arc<U>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<R, M, U> RoomServiceImpl<R, M, U>
where
    R: RoomRepository,
    M: MessageRepository,
    U: UserRepository,
{
    pub fn new(
        room_repo: Arc<R>,
        message_repo: Arc<M>,
        user_repo: Arc<U>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            room_repo,
            message_repo,
            user_repo,
            id_generator,
        }
    }

    /// Load a room the caller participates in
    async fn participant_room(&self, caller_id: i64, room_id: i64) -> Result<Room, RoomError> {
        let room = self
            .room_repo
            .find_by_id(room_id)
            .await?
            .ok_or(RoomError::NotFound)?;

        if !room.includes(caller_id) {
            return Err(RoomError::NotParticipant);
        }
        Ok(room)
    }
}

#[async_trait]
impl<R, M, U> RoomService for RoomServiceImpl<R, M, U>
where
    R: RoomRepository + 'static,
    M: MessageRepository + 'static,
    U: UserRepository + 'static,
{
    async fn create_room(&self, caller_id: i64, user1_id: i64, user2_id: i64) -> Result<Room, RoomError> {
        if user1_id == user2_id {
            return Err(RoomError::SameUser);
        }
        ensure_caller_in(caller_id, user1_id, user2_id)?;

        if let Some(room) = self.room_repo.find_by_participants(user1_id, user2_id).await? {
            return Ok(room);
        }

        for user_id in [user1_id, user2_id] {
            if self.user_repo.find_by_id(user_id).await?.is_none() {
                return Err(RoomError::UserNotFound);
            }
        }

        let room = Room::new(self.id_generator.generate(), user1_id, user2_id);
        let room = self.room_repo.create_or_get(&room).await?;

        tracing::debug!(room_id = room.id, user1_id, user2_id, "Room ready");
        Ok(room)
    }

    async fn list_rooms(&self, caller_id: i64) -> Result<Vec<Room>, RoomError> {
        Ok(self.room_repo.list_by_user(caller_id).await?)
    }

    async fn create_message(&self, caller_id: i64, room_id: i64, content: &str) -> Result<Message, RoomError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(RoomError::EmptyMessage);
        }

        let room = self.participant_room(caller_id, room_id).await?;
        let receiver_id = room
            .other_participant(caller_id)
            .ok_or(RoomError::NotParticipant)?;

        let message = Message::new(
            self.id_generator.generate(),
            room.id,
            caller_id,
            receiver_id,
            content.to_string(),
        );
        Ok(self.message_repo.create(&message).await?)
    }

    async fn room_messages(&self, caller_id: i64, room_id: i64) -> Result<(Room, Vec<Message>), RoomError> {
        let room = self.participant_room(caller_id, room_id).await?;
        let messages = self.message_repo.list_by_room(room.id).await?;
        Ok((room, messages))
    }

    async fn messages_between(&self, caller_id: i64, sender_id: i64, receiver_id: i64) -> Result<Vec<Message>, RoomError> {
        ensure_caller_in(caller_id, sender_id, receiver_id)?;

        // Listed before marking, so the caller still sees which messages were new.
        let messages = self.message_repo.list_between(sender_id, receiver_id).await?;

        let other_id = if caller_id == sender_id { receiver_id } else { sender_id };
        if other_id != caller_id {
            let marked = self.message_repo.mark_seen(other_id, caller_id).await?;
            if marked > 0 {
                tracing::debug!(reader = caller_id, from = other_id, marked, "Messages marked seen");
            }
        }

        Ok(messages)
    }

    async fn last_message(&self, caller_id: i64, a: i64, b: i64) -> Result<Option<Message>, RoomError> {
        ensure_caller_in(caller_id, a, b)?;
        Ok(self.message_repo.last_between(a, b).await?)
    }

    async fn unread_count(&self, caller_id: i64, user_id: i64) -> Result<i64, RoomError> {
        if caller_id != user_id {
            return Err(RoomError::NotParticipant);
        }
        Ok(self.message_repo.count_unread(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockMessageRepository, MockRoomRepository, MockUserRepository, User};
    use pretty_assertions::assert_eq;

    struct Mocks {
        rooms: MockRoomRepository,
        messages: MockMessageRepository,
        users: MockUserRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                rooms: MockRoomRepository::new(),
                messages: MockMessageRepository::new(),
                users: MockUserRepository::new(),
            }
        }

        fn build(self) -> RoomServiceImpl<MockRoomRepository, MockMessageRepository, MockUserRepository> {
            RoomServiceImpl::new(
                Arc::new(self.rooms),
                Arc::new(self.messages),
                Arc::new(self.users),
                Arc::new(SnowflakeGenerator::new(1)),
            )
        }
    }

    fn user(id: i64) -> User {
        User::new(id, "n".into(), format!("u{id}"), format!("u{id}@example.com"), "h".into())
    }

    #[tokio::test]
    async fn test_create_room_same_user() {
        let err = Mocks::new().build().create_room(1, 1, 1).await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_room_for_strangers_is_forbidden() {
        let err = Mocks::new().build().create_room(3, 1, 2).await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_room_returns_existing() {
        let mut mocks = Mocks::new();
        mocks
            .rooms
            .expect_find_by_participants()
            .returning(|a, b| Ok(Some(Room::new(77, a, b))));
        mocks.rooms.expect_create_or_get().times(0);

        let room = mocks.build().create_room(2, 2, 1).await.unwrap();
        assert_eq!(room.id, 77);
        assert_eq!(room.participants, [1, 2]);
    }

    #[tokio::test]
    async fn test_create_room_unknown_user() {
        let mut mocks = Mocks::new();
        mocks.rooms.expect_find_by_participants().returning(|_, _| Ok(None));
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(if id == 1 { Some(user(1)) } else { None }));
        mocks.rooms.expect_create_or_get().times(0);

        let err = mocks.build().create_room(1, 1, 2).await.unwrap_err();
        assert!(matches!(err, RoomError::UserNotFound));
    }

    #[tokio::test]
    async fn test_create_room_new_pair() {
        let mut mocks = Mocks::new();
        mocks.rooms.expect_find_by_participants().returning(|_, _| Ok(None));
        mocks.users.expect_find_by_id().returning(|id| Ok(Some(user(id))));
        mocks
            .rooms
            .expect_create_or_get()
            .times(1)
            .returning(|room| Ok(room.clone()));

        let room = mocks.build().create_room(5, 5, 3).await.unwrap();
        assert_eq!(room.participants, [3, 5]);
    }

    #[tokio::test]
    async fn test_create_message_targets_other_participant() {
        let mut mocks = Mocks::new();
        mocks
            .rooms
            .expect_find_by_id()
            .returning(|id| Ok(Some(Room::new(id, 1, 2))));
        mocks
            .messages
            .expect_create()
            .times(1)
            .returning(|m| Ok(m.clone()));

        let message = mocks.build().create_message(2, 9, "hello").await.unwrap();
        assert_eq!(message.sender_id, 2);
        assert_eq!(message.receiver_id, 1);
        assert_eq!(message.room_id, 9);
        assert!(!message.seen);
    }

    #[tokio::test]
    async fn test_create_message_outsider() {
        let mut mocks = Mocks::new();
        mocks
            .rooms
            .expect_find_by_id()
            .returning(|id| Ok(Some(Room::new(id, 1, 2))));
        mocks.messages.expect_create().times(0);

        let err = mocks.build().create_message(3, 9, "hello").await.unwrap_err();
        assert!(matches!(err, RoomError::NotParticipant));
    }

    #[tokio::test]
    async fn test_messages_between_marks_incoming_seen() {
        let mut mocks = Mocks::new();
        mocks
            .messages
            .expect_mark_seen()
            .times(1)
            .returning(|sender, receiver| {
                assert_eq!((sender, receiver), (2, 1));
                Ok(1)
            });
        mocks.messages.expect_list_between().returning(|_, _| Ok(vec![]));

        mocks.build().messages_between(1, 1, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_messages_between_returns_state_before_marking() {
        let mut mocks = Mocks::new();
        let mut seq = mockall::Sequence::new();
        mocks
            .messages
            .expect_list_between()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|a, b| Ok(vec![Message::new(5, 9, b, a, "unread".to_string())]));
        mocks
            .messages
            .expect_mark_seen()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(1));

        let messages = mocks.build().messages_between(1, 1, 2).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].receiver_id, 1);
        assert!(!messages[0].seen);
    }

    #[tokio::test]
    async fn test_unread_count_for_other_user() {
        let err = Mocks::new().build().unread_count(1, 2).await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Forbidden(_)));
    }
}
