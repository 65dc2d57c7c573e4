//! Notification entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Kind of activity a notification reports.
///
/// Stored as TEXT with a CHECK constraint (`'like' | 'comment' | 'follow'`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Like,
    Comment,
    Follow,
}

impl NotificationType {
    /// Parse the database representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "like" => Some(Self::Like),
            "comment" => Some(Self::Comment),
            "follow" => Some(Self::Follow),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Follow => "follow",
        }
    }
}

/// A notification delivered to `user_id` about an action by `actor_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    /// Recipient
    pub user_id: i64,
    pub notification_type: NotificationType,
    /// User who performed the action
    pub actor_id: i64,
    /// Post involved (likes and comments)
    pub post_id: Option<i64>,
    pub comment_id: Option<i64>,
    /// Copy of the comment text at the time of the comment
    pub comment_text: Option<String>,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(id: i64, user_id: i64, notification_type: NotificationType, actor_id: i64) -> Self {
        Self {
            id,
            user_id,
            notification_type,
            actor_id,
            post_id: None,
            comment_id: None,
            comment_text: None,
            seen: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_post(mut self, post_id: i64) -> Self {
        self.post_id = Some(post_id);
        self
    }

    pub fn with_comment(mut self, comment_id: i64, text: impl Into<String>) -> Self {
        self.comment_id = Some(comment_id);
        self.comment_text = Some(text.into());
        self
    }
}

/// Notification joined with the actor's profile and the post image.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationView {
    pub notification: Notification,
    pub actor_username: String,
    pub actor_profile_image: String,
    pub post_image: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a notification and return it joined with actor and post details.
    async fn create(&self, notification: &Notification) -> Result<NotificationView, AppError>;

    /// Notifications for a recipient, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<NotificationView>, AppError>;

    /// Mark every unseen notification of the user as seen.
    async fn mark_all_seen(&self, user_id: i64) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(NotificationType::Like, "like")]
    #[test_case(NotificationType::Comment, "comment")]
    #[test_case(NotificationType::Follow, "follow")]
    fn test_type_strings(kind: NotificationType, s: &str) {
        assert_eq!(kind.as_str(), s);
        assert_eq!(NotificationType::from_str(s), Some(kind));
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(NotificationType::from_str("mention"), None);
    }

    #[test]
    fn test_builder() {
        let n = Notification::new(1, 2, NotificationType::Comment, 3)
            .with_post(4)
            .with_comment(5, "nice");
        assert_eq!(n.post_id, Some(4));
        assert_eq!(n.comment_id, Some(5));
        assert_eq!(n.comment_text.as_deref(), Some("nice"));
        assert!(!n.seen);
    }
}
