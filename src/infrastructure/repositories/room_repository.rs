//! Room Repository Implementation
//!
//! Rooms are stored with an ordered participant pair, so lookups by pair
//! normalise the order first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Room, RoomRepository};
use crate::shared::error::AppError;

const ROOM_COLUMNS: &str = r#"
    r.id, r.user_low, r.user_high, r.created_at,
    ARRAY(SELECT m.id FROM messages m WHERE m.room_id = r.id ORDER BY m.id) AS messages
"#;

#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    id: i64,
    user_low: i64,
    user_high: i64,
    created_at: DateTime<Utc>,
    messages: Vec<i64>,
}

impl RoomRow {
    fn into_room(self) -> Room {
        Room {
            id: self.id,
            participants: [self.user_low, self.user_high],
            messages: self.messages,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL room repository implementation.
#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Room>, AppError> {
        let sql = format!("SELECT {ROOM_COLUMNS} FROM rooms r WHERE r.id = $1");
        let row = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_room()))
    }

    async fn find_by_participants(&self, a: i64, b: i64) -> Result<Option<Room>, AppError> {
        let (low, high) = Room::ordered_pair(a, b);
        let sql = format!(
            "SELECT {ROOM_COLUMNS} FROM rooms r WHERE r.user_low = $1 AND r.user_high = $2"
        );
        let row = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(low)
            .bind(high)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_room()))
    }

    async fn create_or_get(&self, room: &Room) -> Result<Room, AppError> {
        let [low, high] = room.participants;

        // A concurrent request for the same pair loses the insert and reads the winner's row.
        sqlx::query(
            r#"
            INSERT INTO rooms (id, user_low, user_high, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_low, user_high) DO NOTHING
            "#,
        )
        .bind(room.id)
        .bind(low)
        .bind(high)
        .bind(room.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound("User not found".to_string())
            }
            _ => AppError::Database(e),
        })?;

        self.find_by_participants(low, high)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Room for users {low} and {high} vanished after insert")))
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Room>, AppError> {
        let sql = format!(
            r#"
            SELECT {ROOM_COLUMNS}
            FROM rooms r
            WHERE r.user_low = $1 OR r.user_high = $1
            ORDER BY r.id DESC
            "#
        );
        let rows = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_room()).collect())
    }
}
