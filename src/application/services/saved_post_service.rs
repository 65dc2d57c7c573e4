//! Saved Post Service

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{PostRepository, SavedPost, SavedPostRepository, SavedPostWithPost};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Saved post service trait
#[async_trait]
pub trait SavedPostService: Send + Sync {
    async fn list_saved(&self, user_id: i64) -> Result<Vec<SavedPostWithPost>, SavedPostError>;

    async fn save(&self, user_id: i64, post_id: i64) -> Result<SavedPost, SavedPostError>;

    async fn unsave(&self, user_id: i64, post_id: i64) -> Result<(), SavedPostError>;
}

/// Saved post service errors
#[derive(Debug, thiserror::Error)]
pub enum SavedPostError {
    #[error("Post not found")]
    PostNotFound,

    #[error("Post already saved")]
    AlreadySaved,

    #[error("Post is not saved")]
    NotSaved,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<SavedPostError> for AppError {
    fn from(err: SavedPostError) -> Self {
        match err {
            SavedPostError::PostNotFound | SavedPostError::NotSaved => AppError::NotFound(err.to_string()),
            SavedPostError::AlreadySaved => AppError::Conflict(err.to_string()),
            SavedPostError::Repository(e) => e,
        }
    }
}

/// SavedPostService implementation
pub struct SavedPostServiceImpl<S, P>
where
    S: SavedPostRepository,
    P: PostRepository,
{
    saved_repo: Arc<S>,
    post_repo: Arc<P>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<S, P> SavedPostServiceImpl<S, P>
where
    S: SavedPostRepository,
    P: PostRepository,
{
    pub fn new(saved_repo: Arc<S>, post_repo: Arc<P>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            saved_repo,
            post_repo,
            id_generator,
        }
    }
}

#[async_trait]
impl<S, P> SavedPostService for SavedPostServiceImpl<S, P>
where
    S: SavedPostRepository + 'static,
    P: PostRepository + 'static,
{
    async fn list_saved(&self, user_id: i64) -> Result<Vec<SavedPostWithPost>, SavedPostError> {
        Ok(self.saved_repo.list_by_user(user_id).await?)
    }

    async fn save(&self, user_id: i64, post_id: i64) -> Result<SavedPost, SavedPostError> {
        if self.post_repo.find_by_id(post_id).await?.is_none() {
            return Err(SavedPostError::PostNotFound);
        }

        let saved = SavedPost::new(self.id_generator.generate(), user_id, post_id);
        self.saved_repo
            .create(&saved)
            .await?
            .ok_or(SavedPostError::AlreadySaved)
    }

    async fn unsave(&self, user_id: i64, post_id: i64) -> Result<(), SavedPostError> {
        if !self.saved_repo.delete(user_id, post_id).await? {
            return Err(SavedPostError::NotSaved);
        }
        Ok(())
    }
}
