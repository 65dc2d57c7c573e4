//! Post Service
//!
//! Post creation, feeds, detail views with populated owner and comments,
//! deletion and likes.

use std::sync::Arc;

use async_trait::async_trait;

use super::notification_service::{NotificationEvent, NotificationService};
use crate::domain::{
    clamp_limit, CommentRepository, CommentWithAuthor, Post, PostRepository, UserRepository,
    UserSummary,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Post service trait
#[async_trait]
pub trait PostService: Send + Sync {
    async fn create_post(
        &self,
        user_id: i64,
        image: Option<String>,
        caption: Option<String>,
    ) -> Result<Post, PostError>;

    /// Global feed, newest first
    async fn list_posts(&self, before: Option<i64>, limit: Option<i64>) -> Result<Vec<Post>, PostError>;

    async fn list_user_posts(&self, user_id: i64) -> Result<Vec<Post>, PostError>;

    /// Post with owner and comments populated
    async fn get_post(&self, post_id: i64) -> Result<PostDetail, PostError>;

    async fn delete_post(&self, user_id: i64, post_id: i64) -> Result<(), PostError>;

    async fn like(&self, user_id: i64, post_id: i64) -> Result<Post, PostError>;

    /// Remove a like if present
    async fn dislike(&self, user_id: i64, post_id: i64) -> Result<Post, PostError>;
}

/// A post with its owner and comments resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    pub post: Post,
    pub owner: UserSummary,
    pub comments: Vec<CommentWithAuthor>,
}

/// Post service errors
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("A post needs an image or a caption")]
    Empty,

    #[error("You can only delete your own posts")]
    NotOwner,

    #[error("You have already liked this post")]
    AlreadyLiked,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound | PostError::UserNotFound | PostError::AlreadyLiked => {
                AppError::NotFound(err.to_string())
            }
            PostError::Empty => AppError::BadRequest(err.to_string()),
            PostError::NotOwner => AppError::Forbidden(err.to_string()),
            PostError::Repository(e) => e,
        }
    }
}

/// Trim and drop blank optional text
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// PostService implementation
pub struct PostServiceImpl<P, U, C>
where
    P: PostRepository,
    U: UserRepository,
    C: CommentRepository,
{
    post_repo: Arc<P>,
    user_repo: Arc<U>,
    comment_repo: Arc<C>,
    notifications: Arc<dyn NotificationService>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<P, U, C> PostServiceImpl<P, U, C>
where
    P: PostRepository,
    U: UserRepository,
    C: CommentRepository,
{
    pub fn new(
        post_repo: Arc<P>,
        user_repo: Arc<U>,
        comment_repo: Arc<C>,
        notifications: Arc<dyn NotificationService>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            comment_repo,
            notifications,
            id_generator,
        }
    }

    async fn find_post(&self, post_id: i64) -> Result<Post, PostError> {
        self.post_repo
            .find_by_id(post_id)
            .await?
            .ok_or(PostError::NotFound)
    }
}

#[async_trait]
impl<P, U, C> PostService for PostServiceImpl<P, U, C>
where
    P: PostRepository + 'static,
    U: UserRepository + 'static,
    C: CommentRepository + 'static,
{
    async fn create_post(
        &self,
        user_id: i64,
        image: Option<String>,
        caption: Option<String>,
    ) -> Result<Post, PostError> {
        let image = non_blank(image);
        let caption = non_blank(caption);
        if image.is_none() && caption.is_none() {
            return Err(PostError::Empty);
        }

        let post = Post::new(self.id_generator.generate(), user_id, image, caption);
        let created = self.post_repo.create(&post).await?;

        tracing::debug!(post_id = created.id, user_id, "Post created");
        Ok(created)
    }

    async fn list_posts(&self, before: Option<i64>, limit: Option<i64>) -> Result<Vec<Post>, PostError> {
        Ok(self.post_repo.list(before, clamp_limit(limit)).await?)
    }

    async fn list_user_posts(&self, user_id: i64) -> Result<Vec<Post>, PostError> {
        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(PostError::UserNotFound);
        }
        Ok(self.post_repo.list_by_user(user_id).await?)
    }

    async fn get_post(&self, post_id: i64) -> Result<PostDetail, PostError> {
        let post = self.find_post(post_id).await?;

        let owner = self
            .user_repo
            .find_by_id(post.user_id)
            .await?
            .map(|u| UserSummary::from(&u))
            .ok_or_else(|| AppError::Internal(format!("Owner of post {} is missing", post.id)))?;

        let comments = self.comment_repo.list_by_post(post.id).await?;

        Ok(PostDetail {
            post,
            owner,
            comments,
        })
    }

    async fn delete_post(&self, user_id: i64, post_id: i64) -> Result<(), PostError> {
        let post = self.find_post(post_id).await?;
        if !post.is_owned_by(user_id) {
            return Err(PostError::NotOwner);
        }

        if !self.post_repo.delete(post_id).await? {
            return Err(PostError::NotFound);
        }

        tracing::debug!(post_id, user_id, "Post deleted");
        Ok(())
    }

    async fn like(&self, user_id: i64, post_id: i64) -> Result<Post, PostError> {
        let mut post = self.find_post(post_id).await?;

        if !self.post_repo.add_like(post_id, user_id).await? {
            return Err(PostError::AlreadyLiked);
        }
        post.likes.push(user_id);

        self.notifications
            .notify(NotificationEvent::Like {
                recipient_id: post.user_id,
                actor_id: user_id,
                post_id,
            })
            .await;

        Ok(post)
    }

    async fn dislike(&self, user_id: i64, post_id: i64) -> Result<Post, PostError> {
        let mut post = self.find_post(post_id).await?;

        if self.post_repo.remove_like(post_id, user_id).await? {
            post.likes.retain(|id| *id != user_id);
        }

        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::notification_service::MockNotificationService;
    use crate::domain::{MockCommentRepository, MockPostRepository, MockUserRepository, User};
    use test_case::test_case;

    type Service = PostServiceImpl<MockPostRepository, MockUserRepository, MockCommentRepository>;

    struct Mocks {
        posts: MockPostRepository,
        users: MockUserRepository,
        comments: MockCommentRepository,
        notifications: MockNotificationService,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                posts: MockPostRepository::new(),
                users: MockUserRepository::new(),
                comments: MockCommentRepository::new(),
                notifications: MockNotificationService::new(),
            }
        }

        fn build(self) -> Service {
            PostServiceImpl::new(
                Arc::new(self.posts),
                Arc::new(self.users),
                Arc::new(self.comments),
                Arc::new(self.notifications),
                Arc::new(SnowflakeGenerator::new(1)),
            )
        }
    }

    fn post(id: i64, owner: i64) -> Post {
        Post::new(id, owner, Some("photo.jpg".into()), Some("caption".into()))
    }

    #[test_case(None, None ; "both missing")]
    #[test_case(Some("   ".to_string()), None ; "blank image")]
    #[test_case(None, Some("".to_string()) ; "empty caption")]
    #[tokio::test]
    async fn test_create_post_requires_content(image: Option<String>, caption: Option<String>) {
        let mut mocks = Mocks::new();
        mocks.posts.expect_create().times(0);

        let err = mocks.build().create_post(1, image, caption).await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_post_caption_only() {
        let mut mocks = Mocks::new();
        mocks.posts.expect_create().times(1).returning(|p| Ok(p.clone()));

        let created = mocks
            .build()
            .create_post(1, None, Some("  hello  ".into()))
            .await
            .unwrap();
        assert_eq!(created.caption.as_deref(), Some("hello"));
        assert_eq!(created.image, None);
        assert_eq!(created.user_id, 1);
    }

    #[tokio::test]
    async fn test_delete_post_by_non_owner() {
        let mut mocks = Mocks::new();
        mocks.posts.expect_find_by_id().returning(|id| Ok(Some(post(id, 1))));
        mocks.posts.expect_delete().times(0);

        let err = mocks.build().delete_post(2, 10).await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_post() {
        let mut mocks = Mocks::new();
        mocks.posts.expect_find_by_id().returning(|_| Ok(None));

        let err = mocks.build().delete_post(1, 10).await.unwrap_err();
        assert!(matches!(err, PostError::NotFound));
    }

    #[tokio::test]
    async fn test_like_notifies_owner() {
        let mut mocks = Mocks::new();
        mocks.posts.expect_find_by_id().returning(|id| Ok(Some(post(id, 1))));
        mocks.posts.expect_add_like().times(1).returning(|_, _| Ok(true));
        mocks.notifications.expect_notify().times(1).returning(|event| {
            assert_eq!(event.recipient_id(), 1);
            assert_eq!(event.actor_id(), 2);
        });

        let liked = mocks.build().like(2, 10).await.unwrap();
        assert!(liked.is_liked_by(2));
    }

    #[tokio::test]
    async fn test_like_twice_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.posts.expect_find_by_id().returning(|id| Ok(Some(post(id, 1))));
        mocks.posts.expect_add_like().returning(|_, _| Ok(false));
        mocks.notifications.expect_notify().times(0);

        let err = mocks.build().like(2, 10).await.unwrap_err();
        match AppError::from(err) {
            AppError::NotFound(msg) => assert_eq!(msg, "You have already liked this post"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dislike_without_like_succeeds() {
        let mut mocks = Mocks::new();
        mocks.posts.expect_find_by_id().returning(|id| Ok(Some(post(id, 1))));
        mocks.posts.expect_remove_like().returning(|_, _| Ok(false));

        let result = mocks.build().dislike(2, 10).await;
        tokio_test::assert_ok!(result);
    }

    #[tokio::test]
    async fn test_get_post_populates_owner_and_comments() {
        let mut mocks = Mocks::new();
        mocks.posts.expect_find_by_id().returning(|id| Ok(Some(post(id, 1))));
        mocks.users.expect_find_by_id().returning(|id| {
            Ok(Some(User::new(id, "Owner".into(), "owner".into(), "o@example.com".into(), "h".into())))
        });
        mocks.comments.expect_list_by_post().returning(|_| Ok(vec![]));

        let detail = mocks.build().get_post(10).await.unwrap();
        assert_eq!(detail.owner.username, "owner");
        assert!(detail.comments.is_empty());
    }

    #[tokio::test]
    async fn test_list_posts_clamps_limit() {
        let mut mocks = Mocks::new();
        mocks.posts.expect_list().times(1).returning(|_, limit| {
            assert_eq!(limit, 100);
            Ok(vec![])
        });

        mocks.build().list_posts(None, Some(5000)).await.unwrap();
    }
}
