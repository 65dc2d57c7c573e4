//! Notification Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Notification, NotificationRepository, NotificationType, NotificationView};
use crate::shared::error::AppError;

/// Notification row joined with actor and post details.
#[derive(Debug, sqlx::FromRow)]
struct NotificationViewRow {
    id: i64,
    user_id: i64,
    notification_type: String,
    actor_id: i64,
    post_id: Option<i64>,
    comment_id: Option<i64>,
    comment_text: Option<String>,
    seen: bool,
    created_at: DateTime<Utc>,
    actor_username: String,
    actor_profile_image: String,
    post_image: Option<String>,
}

impl NotificationViewRow {
    fn into_view(self) -> Result<NotificationView, AppError> {
        let notification_type = NotificationType::from_str(&self.notification_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown notification type '{}'", self.notification_type))
        })?;

        Ok(NotificationView {
            notification: Notification {
                id: self.id,
                user_id: self.user_id,
                notification_type,
                actor_id: self.actor_id,
                post_id: self.post_id,
                comment_id: self.comment_id,
                comment_text: self.comment_text,
                seen: self.seen,
                created_at: self.created_at,
            },
            actor_username: self.actor_username,
            actor_profile_image: self.actor_profile_image,
            post_image: self.post_image,
        })
    }
}

/// PostgreSQL notification repository implementation.
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: &Notification) -> Result<NotificationView, AppError> {
        let row = sqlx::query_as::<_, NotificationViewRow>(
            r#"
            WITH n AS (
                INSERT INTO notifications
                    (id, user_id, notification_type, actor_id, post_id, comment_id, comment_text, seen, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
            )
            SELECT n.id, n.user_id, n.notification_type, n.actor_id, n.post_id, n.comment_id,
                   n.comment_text, n.seen, n.created_at,
                   u.username AS actor_username,
                   u.profile_image AS actor_profile_image,
                   p.image AS post_image
            FROM n
            JOIN users u ON u.id = n.actor_id
            LEFT JOIN posts p ON p.id = n.post_id
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.notification_type.as_str())
        .bind(notification.actor_id)
        .bind(notification.post_id)
        .bind(notification.comment_id)
        .bind(&notification.comment_text)
        .bind(notification.seen)
        .bind(notification.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.into_view()
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<NotificationView>, AppError> {
        let rows = sqlx::query_as::<_, NotificationViewRow>(
            r#"
            SELECT n.id, n.user_id, n.notification_type, n.actor_id, n.post_id, n.comment_id,
                   n.comment_text, n.seen, n.created_at,
                   u.username AS actor_username,
                   u.profile_image AS actor_profile_image,
                   p.image AS post_image
            FROM notifications n
            JOIN users u ON u.id = n.actor_id
            LEFT JOIN posts p ON p.id = n.post_id
            WHERE n.user_id = $1
            ORDER BY n.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_view()).collect()
    }

    async fn mark_all_seen(&self, user_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET seen = TRUE WHERE user_id = $1 AND NOT seen")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
