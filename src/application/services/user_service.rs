//! User Service
//!
//! Profile lookups and the follow graph.

use std::sync::Arc;

use async_trait::async_trait;

use super::notification_service::{NotificationEvent, NotificationService};
use crate::domain::{UserProfile, UserRepository, UserSummary};
use crate::shared::error::AppError;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get a user with all relationship lists
    async fn get_profile(&self, user_id: i64) -> Result<UserProfile, UserError>;

    /// `follower_id` starts following `target_id`
    async fn follow(&self, follower_id: i64, target_id: i64) -> Result<(), UserError>;

    /// `follower_id` stops following `target_id`
    async fn unfollow(&self, follower_id: i64, target_id: i64) -> Result<(), UserError>;

    async fn followers(&self, user_id: i64) -> Result<Vec<UserSummary>, UserError>;

    async fn following(&self, user_id: i64) -> Result<Vec<UserSummary>, UserError>;
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("You cannot follow yourself")]
    SelfFollow,

    #[error("You are already following this user")]
    AlreadyFollowing,

    #[error("You are not following this user")]
    NotFollowing,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound | UserError::NotFollowing => AppError::NotFound(err.to_string()),
            UserError::SelfFollow => AppError::BadRequest(err.to_string()),
            UserError::AlreadyFollowing => AppError::Conflict(err.to_string()),
            UserError::Repository(e) => e,
        }
    }
}

/// UserService implementation
pub struct UserServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    notifications: Arc<dyn NotificationService>,
}

impl<U> UserServiceImpl<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, notifications: Arc<dyn NotificationService>) -> Self {
        Self {
            user_repo,
            notifications,
        }
    }

    async fn ensure_exists(&self, user_id: i64) -> Result<(), UserError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .map(|_| ())
            .ok_or(UserError::NotFound)
    }
}

#[async_trait]
impl<U> UserService for UserServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn get_profile(&self, user_id: i64) -> Result<UserProfile, UserError> {
        self.user_repo
            .find_profile(user_id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn follow(&self, follower_id: i64, target_id: i64) -> Result<(), UserError> {
        if follower_id == target_id {
            return Err(UserError::SelfFollow);
        }
        self.ensure_exists(target_id).await?;

        if !self.user_repo.add_follow(follower_id, target_id).await? {
            return Err(UserError::AlreadyFollowing);
        }

        self.notifications
            .notify(NotificationEvent::Follow {
                recipient_id: target_id,
                actor_id: follower_id,
            })
            .await;

        Ok(())
    }

    async fn unfollow(&self, follower_id: i64, target_id: i64) -> Result<(), UserError> {
        if !self.user_repo.remove_follow(follower_id, target_id).await? {
            return Err(UserError::NotFollowing);
        }
        Ok(())
    }

    async fn followers(&self, user_id: i64) -> Result<Vec<UserSummary>, UserError> {
        self.ensure_exists(user_id).await?;
        Ok(self.user_repo.list_followers(user_id).await?)
    }

    async fn following(&self, user_id: i64) -> Result<Vec<UserSummary>, UserError> {
        self.ensure_exists(user_id).await?;
        Ok(self.user_repo.list_following(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::notification_service::MockNotificationService;
    use crate::domain::{MockUserRepository, User};
    use pretty_assertions::assert_eq;

    fn user(id: i64) -> User {
        User::new(id, format!("User {id}"), format!("user{id}"), format!("user{id}@example.com"), "hash".into())
    }

    fn service(
        repo: MockUserRepository,
        notifications: MockNotificationService,
    ) -> UserServiceImpl<MockUserRepository> {
        UserServiceImpl::new(Arc::new(repo), Arc::new(notifications))
    }

    #[tokio::test]
    async fn test_follow_notifies_target() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|id| Ok(Some(user(id))));
        repo.expect_add_follow().times(1).returning(|_, _| Ok(true));

        let mut notifications = MockNotificationService::new();
        notifications
            .expect_notify()
            .times(1)
            .returning(|event| {
                assert_eq!(
                    event,
                    NotificationEvent::Follow {
                        recipient_id: 2,
                        actor_id: 1
                    }
                );
            });

        service(repo, notifications).follow(1, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_follow_self_is_rejected() {
        let repo = MockUserRepository::new();
        let err = service(repo, MockNotificationService::new())
            .follow(3, 3)
            .await
            .unwrap_err();
        assert!(matches!(AppError::from(err), AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_follow_missing_target() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_add_follow().times(0);

        let err = service(repo, MockNotificationService::new())
            .follow(1, 99)
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NotFound));
    }

    #[tokio::test]
    async fn test_follow_twice_conflicts() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|id| Ok(Some(user(id))));
        repo.expect_add_follow().returning(|_, _| Ok(false));
        let mut notifications = MockNotificationService::new();
        notifications.expect_notify().times(0);

        let err = service(repo, notifications).follow(1, 2).await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unfollow_when_not_following() {
        let mut repo = MockUserRepository::new();
        repo.expect_remove_follow().returning(|_, _| Ok(false));

        let err = service(repo, MockNotificationService::new())
            .unfollow(1, 2)
            .await
            .unwrap_err();
        assert!(matches!(AppError::from(err), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_profile_missing() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_profile().returning(|_| Ok(None));

        let err = service(repo, MockNotificationService::new())
            .get_profile(5)
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NotFound));
    }

    #[tokio::test]
    async fn test_followers_lists_summaries() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|id| Ok(Some(user(id))));
        repo.expect_list_followers()
            .returning(|_| Ok(vec![UserSummary::from(&user(2)), UserSummary::from(&user(3))]));

        let followers = service(repo, MockNotificationService::new())
            .followers(1)
            .await
            .unwrap();
        let ids: Vec<i64> = followers.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
