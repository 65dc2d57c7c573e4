//! Direct message entity and repository trait.
//!
//! Maps to the `messages` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Longest message body accepted.
pub const MAX_MESSAGE_LENGTH: u64 = 4000;

/// A message exchanged inside a room.
///
/// Database columns:
/// - id: BIGINT PRIMARY KEY
/// - room_id: BIGINT REFERENCES rooms(id) ON DELETE CASCADE
/// - sender_id / receiver_id: BIGINT REFERENCES users(id) ON DELETE CASCADE
/// - content: TEXT NOT NULL
/// - seen: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub room_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    /// Set once the receiver opened the conversation
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(id: i64, room_id: i64, sender_id: i64, receiver_id: i64, content: String) -> Self {
        Self {
            id,
            room_id,
            sender_id,
            receiver_id,
            content,
            seen: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: &Message) -> Result<Message, AppError>;

    /// All messages of a room, oldest first.
    async fn list_by_room(&self, room_id: i64) -> Result<Vec<Message>, AppError>;

    /// Messages exchanged between two users in either direction, oldest first.
    async fn list_between(&self, a: i64, b: i64) -> Result<Vec<Message>, AppError>;

    /// Mark every unseen message from `sender_id` to `receiver_id` as seen.
    ///
    /// Returns the number of rows updated.
    async fn mark_seen(&self, sender_id: i64, receiver_id: i64) -> Result<u64, AppError>;

    /// Most recent message between two users in either direction.
    async fn last_between(&self, a: i64, b: i64) -> Result<Option<Message>, AppError>;

    /// Number of unseen messages addressed to the user.
    async fn count_unread(&self, receiver_id: i64) -> Result<i64, AppError>;
}
