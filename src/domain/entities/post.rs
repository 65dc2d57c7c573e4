//! Post entity and repository trait.
//!
//! Maps to the `posts` table; likes live in `post_likes` and comment ids are
//! collected from `comments`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Default page size for post listings.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A photo post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,

    /// Owner of the post
    pub user_id: i64,

    /// Image file name or URL
    pub image: Option<String>,

    pub caption: Option<String>,

    /// Users who liked the post, oldest like first
    #[serde(default)]
    pub likes: Vec<i64>,

    /// Comment ids on the post, oldest first
    #[serde(default)]
    pub comments: Vec<i64>,

    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(id: i64, user_id: i64, image: Option<String>, caption: Option<String>) -> Self {
        Self {
            id,
            user_id,
            image,
            caption,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    pub fn is_liked_by(&self, user_id: i64) -> bool {
        self.likes.contains(&user_id)
    }
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: &Post) -> Result<Post, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError>;

    /// Newest first; `before` is an exclusive id cursor.
    async fn list(&self, before: Option<i64>, limit: i64) -> Result<Vec<Post>, AppError>;

    /// All posts of one user, newest first.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Post>, AppError>;

    /// Delete a post; comments, likes, saves and notifications cascade.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Returns false when the user had already liked the post.
    async fn add_like(&self, post_id: i64, user_id: i64) -> Result<bool, AppError>;

    /// Returns false when there was no like to remove.
    async fn remove_like(&self, post_id: i64, user_id: i64) -> Result<bool, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_ownership_and_likes() {
        let mut post = Post::new(10, 1, Some("a.jpg".into()), None);
        assert!(post.is_owned_by(1));
        assert!(!post.is_owned_by(2));
        assert!(!post.is_liked_by(2));

        post.likes.push(2);
        assert!(post.is_liked_by(2));
    }

    #[test_case(None, DEFAULT_PAGE_SIZE)]
    #[test_case(Some(0), 1)]
    #[test_case(Some(-3), 1)]
    #[test_case(Some(20), 20)]
    #[test_case(Some(1000), MAX_PAGE_SIZE)]
    fn test_clamp_limit(input: Option<i64>, expected: i64) {
        assert_eq!(clamp_limit(input), expected);
    }
}
