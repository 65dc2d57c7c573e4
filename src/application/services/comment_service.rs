//! Comment Service

use std::sync::Arc;

use async_trait::async_trait;

use super::notification_service::{NotificationEvent, NotificationService};
use crate::domain::{Comment, CommentRepository, CommentWithAuthor, PostRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Comment service trait
#[async_trait]
pub trait CommentService: Send + Sync {
    /// Comment on a post and notify its owner
    async fn comment(&self, user_id: i64, post_id: i64, text: &str) -> Result<Comment, CommentError>;

    /// Comments of a post with authors, oldest first
    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>, CommentError>;

    async fn delete_comment(&self, user_id: i64, post_id: i64, comment_id: i64) -> Result<(), CommentError>;
}

/// Comment service errors
#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("Post not found")]
    PostNotFound,

    #[error("Comment not found")]
    NotFound,

    #[error("Comment cannot be empty")]
    Empty,

    #[error("You are not authorized to delete this comment")]
    NotAuthor,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<CommentError> for AppError {
    fn from(err: CommentError) -> Self {
        match err {
            CommentError::PostNotFound | CommentError::NotFound => AppError::NotFound(err.to_string()),
            CommentError::Empty => AppError::BadRequest(err.to_string()),
            CommentError::NotAuthor => AppError::Forbidden(err.to_string()),
            CommentError::Repository(e) => e,
        }
    }
}

/// CommentService implementation
pub struct CommentServiceImpl<C, P>
where
    C: CommentRepository,
    P: PostRepository,
{
    comment_repo: Arc<C>,
    post_repo: Arc<P>,
    notifications: Arc<dyn NotificationService>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<C, P> CommentServiceImpl<C, P>
where
    C: CommentRepository,
    P: PostRepository,
{
    pub fn new(
        comment_repo: Arc<C>,
        post_repo: Arc<P>,
        notifications: Arc<dyn NotificationService>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            notifications,
            id_generator,
        }
    }
}

#[async_trait]
impl<C, P> CommentService for CommentServiceImpl<C, P>
where
    C: CommentRepository + 'static,
    P: PostRepository + 'static,
{
    async fn comment(&self, user_id: i64, post_id: i64, text: &str) -> Result<Comment, CommentError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CommentError::Empty);
        }

        let post = self
            .post_repo
            .find_by_id(post_id)
            .await?
            .ok_or(CommentError::PostNotFound)?;

        let comment = Comment::new(self.id_generator.generate(), post.id, user_id, text.to_string());
        let created = self.comment_repo.create(&comment).await?;

        self.notifications
            .notify(NotificationEvent::Comment {
                recipient_id: post.user_id,
                actor_id: user_id,
                post_id: post.id,
                comment_id: created.id,
                text: created.comment.clone(),
            })
            .await;

        Ok(created)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>, CommentError> {
        if self.post_repo.find_by_id(post_id).await?.is_none() {
            return Err(CommentError::PostNotFound);
        }
        Ok(self.comment_repo.list_by_post(post_id).await?)
    }

    async fn delete_comment(&self, user_id: i64, post_id: i64, comment_id: i64) -> Result<(), CommentError> {
        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or(CommentError::NotFound)?;

        if !comment.is_authored_by(user_id) {
            return Err(CommentError::NotAuthor);
        }

        if !self.comment_repo.delete(comment.id).await? {
            return Err(CommentError::NotFound);
        }
        Ok(())
    }
}
