//! Notification Service
//!
//! Persists activity notifications and pushes them to the recipient's live
//! gateway sessions. Delivery is best effort: a failed notification is logged
//! and never fails the action that triggered it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Notification, NotificationRepository, NotificationType, NotificationView};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Activity that produces a notification.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Follow {
        recipient_id: i64,
        actor_id: i64,
    },
    Like {
        recipient_id: i64,
        actor_id: i64,
        post_id: i64,
    },
    Comment {
        recipient_id: i64,
        actor_id: i64,
        post_id: i64,
        comment_id: i64,
        text: String,
    },
}

impl NotificationEvent {
    pub fn recipient_id(&self) -> i64 {
        match self {
            Self::Follow { recipient_id, .. }
            | Self::Like { recipient_id, .. }
            | Self::Comment { recipient_id, .. } => *recipient_id,
        }
    }

    pub fn actor_id(&self) -> i64 {
        match self {
            Self::Follow { actor_id, .. }
            | Self::Like { actor_id, .. }
            | Self::Comment { actor_id, .. } => *actor_id,
        }
    }

    fn into_notification(self, id: i64) -> Notification {
        match self {
            Self::Follow { recipient_id, actor_id } => {
                Notification::new(id, recipient_id, NotificationType::Follow, actor_id)
            }
            Self::Like { recipient_id, actor_id, post_id } => {
                Notification::new(id, recipient_id, NotificationType::Like, actor_id).with_post(post_id)
            }
            Self::Comment {
                recipient_id,
                actor_id,
                post_id,
                comment_id,
                text,
            } => Notification::new(id, recipient_id, NotificationType::Comment, actor_id)
                .with_post(post_id)
                .with_comment(comment_id, text),
        }
    }
}

/// Pushes a stored notification to the recipient's connected clients.
///
/// Implemented by the WebSocket gateway.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationDispatcher: Send + Sync {
    /// Returns true when at least one live session received the notification.
    fn dispatch(&self, notification: &NotificationView) -> bool;
}

/// Notification service trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Store and push a notification. Never fails.
    async fn notify(&self, event: NotificationEvent);

    /// Notifications for a user, newest first
    async fn list(&self, user_id: i64) -> Result<Vec<NotificationView>, NotificationError>;

    /// Mark all of a user's notifications as seen; returns how many changed
    async fn mark_all_seen(&self, user_id: i64) -> Result<u64, NotificationError>;
}

/// Notification service errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Repository(e) => e,
        }
    }
}

/// NotificationService implementation
pub struct NotificationServiceImpl<N>
where
    N: NotificationRepository,
{
    notification_repo: Arc<N>,
    id_generator: Arc<SnowflakeGenerator>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl<N> NotificationServiceImpl<N>
where
    N: NotificationRepository,
{
    pub fn new(
        notification_repo: Arc<N>,
        id_generator: Arc<SnowflakeGenerator>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            notification_repo,
            id_generator,
            dispatcher,
        }
    }
}

#[async_trait]
impl<N> NotificationService for NotificationServiceImpl<N>
where
    N: NotificationRepository + 'static,
{
    async fn notify(&self, event: NotificationEvent) {
        if event.recipient_id() == event.actor_id() {
            return;
        }

        let notification = event.into_notification(self.id_generator.generate());
        match self.notification_repo.create(&notification).await {
            Ok(view) => {
                let pushed = self.dispatcher.dispatch(&view);
                tracing::debug!(
                    notification_id = view.notification.id,
                    recipient_id = view.notification.user_id,
                    kind = view.notification.notification_type.as_str(),
                    pushed,
                    "Notification created"
                );
            }
            Err(e) => {
                tracing::warn!(
                    recipient_id = notification.user_id,
                    kind = notification.notification_type.as_str(),
                    error = %e,
                    "Failed to store notification"
                );
            }
        }
    }

    async fn list(&self, user_id: i64) -> Result<Vec<NotificationView>, NotificationError> {
        Ok(self.notification_repo.list_for_user(user_id).await?)
    }

    async fn mark_all_seen(&self, user_id: i64) -> Result<u64, NotificationError> {
        Ok(self.notification_repo.mark_all_seen(user_id).await?)
    }
}
