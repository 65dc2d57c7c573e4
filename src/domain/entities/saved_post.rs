//! Saved-post bookmark entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Post;
use crate::shared::error::AppError;

/// A user's bookmark of a post. Unique per (user_id, post_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPost {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

impl SavedPost {
    pub fn new(id: i64, user_id: i64, post_id: i64) -> Self {
        Self {
            id,
            user_id,
            post_id,
            created_at: Utc::now(),
        }
    }
}

/// Bookmark together with the saved post.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPostWithPost {
    pub saved: SavedPost,
    pub post: Post,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SavedPostRepository: Send + Sync {
    /// Insert a bookmark. Returns `None` when the post was already saved.
    async fn create(&self, saved: &SavedPost) -> Result<Option<SavedPost>, AppError>;

    /// Returns false when there was no bookmark to remove.
    async fn delete(&self, user_id: i64, post_id: i64) -> Result<bool, AppError>;

    /// Bookmarks of a user with their posts, newest save first.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<SavedPostWithPost>, AppError>;
}
