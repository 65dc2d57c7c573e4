//! Direct-message room entity and repository trait.
//!
//! A room joins exactly two distinct users. The pair is stored ordered
//! (`user_low < user_high`) so a unique index guarantees one room per pair.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,

    /// Both participants, lower id first
    pub participants: [i64; 2],

    /// Message ids in the room, oldest first
    #[serde(default)]
    pub messages: Vec<i64>,

    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Create a room for two users. Caller guarantees `a != b`.
    pub fn new(id: i64, a: i64, b: i64) -> Self {
        let (low, high) = Self::ordered_pair(a, b);
        Self {
            id,
            participants: [low, high],
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Canonical storage order of a participant pair.
    pub fn ordered_pair(a: i64, b: i64) -> (i64, i64) {
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn includes(&self, user_id: i64) -> bool {
        self.participants.contains(&user_id)
    }

    /// The participant that is not `user_id`, if `user_id` is in the room.
    pub fn other_participant(&self, user_id: i64) -> Option<i64> {
        match self.participants {
            [a, b] if a == user_id => Some(b),
            [a, b] if b == user_id => Some(a),
            _ => None,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Room>, AppError>;

    /// Look up the room of a pair in either order.
    async fn find_by_participants(&self, a: i64, b: i64) -> Result<Option<Room>, AppError>;

    /// Insert a room, or return the existing one when the pair already has a room.
    async fn create_or_get(&self, room: &Room) -> Result<Room, AppError>;

    /// Rooms the user participates in, newest first.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Room>, AppError>;
}
