//! Saved Post Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::post_repository::{PostRow, POST_COLUMNS};
use crate::domain::{SavedPost, SavedPostRepository, SavedPostWithPost};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct SavedPostRow {
    id: i64,
    user_id: i64,
    post_id: i64,
    created_at: DateTime<Utc>,
}

impl SavedPostRow {
    fn into_saved_post(self) -> SavedPost {
        SavedPost {
            id: self.id,
            user_id: self.user_id,
            post_id: self.post_id,
            created_at: self.created_at,
        }
    }
}

/// Bookmark columns are aliased so they do not clash with the post's own.
#[derive(Debug, sqlx::FromRow)]
struct SavedPostJoinRow {
    saved_id: i64,
    saved_by: i64,
    saved_at: DateTime<Utc>,
    #[sqlx(flatten)]
    post: PostRow,
}

impl SavedPostJoinRow {
    fn into_saved_with_post(self) -> SavedPostWithPost {
        let post = self.post.into_post();
        SavedPostWithPost {
            saved: SavedPost {
                id: self.saved_id,
                user_id: self.saved_by,
                post_id: post.id,
                created_at: self.saved_at,
            },
            post,
        }
    }
}

/// PostgreSQL saved-post repository implementation.
#[derive(Clone)]
pub struct PgSavedPostRepository {
    pool: PgPool,
}

impl PgSavedPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SavedPostRepository for PgSavedPostRepository {
    async fn create(&self, saved: &SavedPost) -> Result<Option<SavedPost>, AppError> {
        let row = sqlx::query_as::<_, SavedPostRow>(
            r#"
            INSERT INTO saved_posts (id, user_id, post_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, post_id) DO NOTHING
            RETURNING id, user_id, post_id, created_at
            "#,
        )
        .bind(saved.id)
        .bind(saved.user_id)
        .bind(saved.post_id)
        .bind(saved.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound("Post not found".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.map(|r| r.into_saved_post()))
    }

    async fn delete(&self, user_id: i64, post_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM saved_posts WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<SavedPostWithPost>, AppError> {
        let sql = format!(
            r#"
            SELECT s.id AS saved_id, s.user_id AS saved_by, s.created_at AS saved_at, {POST_COLUMNS}
            FROM saved_posts s
            JOIN posts p ON p.id = s.post_id
            WHERE s.user_id = $1
            ORDER BY s.id DESC
            "#
        );
        let rows = sqlx::query_as::<_, SavedPostJoinRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_saved_with_post()).collect())
    }
}
