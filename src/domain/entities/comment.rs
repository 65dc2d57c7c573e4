//! Comment entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserSummary;
use crate::shared::error::AppError;

/// A comment on a post.
///
/// Maps to the `comments` table (`post_id` and `user_id` cascade on delete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    /// Post the comment was left on
    pub post_id: i64,
    /// Author
    pub user_id: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(id: i64, post_id: i64, user_id: i64, comment: String) -> Self {
        Self {
            id,
            post_id,
            user_id,
            comment,
            created_at: Utc::now(),
        }
    }

    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

/// Comment with its author resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author: UserSummary,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &Comment) -> Result<Comment, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError>;

    /// Comments on a post with authors, oldest first.
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
