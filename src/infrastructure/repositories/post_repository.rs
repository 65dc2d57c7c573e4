//! Post Repository Implementation
//!
//! Posts with their like and comment id lists. Lists are aggregated from
//! `post_likes` and `comments` on read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Post, PostRepository};
use crate::shared::error::AppError;

/// Select list shared by every post query. Expects `posts` aliased as `p`.
pub(crate) const POST_COLUMNS: &str = r#"
    p.id, p.user_id, p.image, p.caption, p.created_at,
    ARRAY(SELECT l.user_id FROM post_likes l WHERE l.post_id = p.id ORDER BY l.created_at) AS likes,
    ARRAY(SELECT c.id FROM comments c WHERE c.post_id = p.id ORDER BY c.id) AS comments
"#;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PostRow {
    id: i64,
    user_id: i64,
    image: Option<String>,
    caption: Option<String>,
    created_at: DateTime<Utc>,
    likes: Vec<i64>,
    comments: Vec<i64>,
}

impl PostRow {
    pub(crate) fn into_post(self) -> Post {
        Post {
            id: self.id,
            user_id: self.user_id,
            image: self.image,
            caption: self.caption,
            likes: self.likes,
            comments: self.comments,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL post repository implementation.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, post: &Post) -> Result<Post, AppError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, image, caption, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(post.id)
        .bind(post.user_id)
        .bind(&post.image)
        .bind(&post.caption)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(Post {
            likes: Vec::new(),
            comments: Vec::new(),
            ..post.clone()
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_post()))
    }

    async fn list(&self, before: Option<i64>, limit: i64) -> Result<Vec<Post>, AppError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            WHERE ($1::BIGINT IS NULL OR p.id < $1)
            ORDER BY p.id DESC
            LIMIT $2
            "#
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(before)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_post()).collect())
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Post>, AppError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.user_id = $1 ORDER BY p.id DESC"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_post()).collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn add_like(&self, post_id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound("Post not found".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_like(&self, post_id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
