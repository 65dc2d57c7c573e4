//! Response DTOs
//!
//! Data structures for API response bodies. Field names are camelCase and
//! every id is a string so 64-bit snowflakes survive JavaScript clients.

use serde::Serialize;

use crate::application::services::{AuthToken, PostDetail};
use crate::domain::{
    Comment, CommentWithAuthor, Message, NotificationView, Post, Room, SavedPostWithPost, User,
    UserProfile, UserSummary,
};

/// Literal `"success"` carried by every envelope.
pub const STATUS_SUCCESS: &str = "success";

fn ids(values: &[i64]) -> Vec<String> {
    values.iter().map(i64::to_string).collect()
}

/// Full user representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub profile_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub following: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commented: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_posts: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

impl UserResponse {
    /// Account fields only; used right after signup/login.
    pub fn from_user(user: User, include_email: bool) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            username: user.username,
            email: include_email.then_some(user.email),
            profile_image: user.profile_image,
            following: None,
            followers: None,
            posts: None,
            liked: None,
            commented: None,
            room_id: None,
            saved_posts: None,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }

    pub fn from_profile(profile: UserProfile, include_email: bool) -> Self {
        Self {
            following: Some(ids(&profile.following)),
            followers: Some(ids(&profile.followers)),
            posts: Some(ids(&profile.posts)),
            liked: Some(ids(&profile.liked)),
            commented: Some(ids(&profile.commented)),
            room_id: Some(ids(&profile.rooms)),
            saved_posts: Some(ids(&profile.saved_posts)),
            ..Self::from_user(profile.user, include_email)
        }
    }
}

/// Compact user representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryResponse {
    pub id: String,
    pub name: String,
    pub username: String,
    pub profile_image: String,
}

impl From<UserSummary> for UserSummaryResponse {
    fn from(summary: UserSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            name: summary.name,
            username: summary.username,
            profile_image: summary.profile_image,
        }
    }
}

/// Signup/login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub user: UserResponse,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthResponse {
    pub fn new(message: &'static str, user: User, token: AuthToken) -> Self {
        Self {
            status: STATUS_SUCCESS,
            message,
            user: UserResponse::from_user(user, true),
            token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
        }
    }
}

/// Single user envelope
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub status: &'static str,
    pub user: UserResponse,
}

/// Follower/following list envelope
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub status: &'static str,
    pub users: Vec<UserSummaryResponse>,
}

impl UserListResponse {
    pub fn new(users: Vec<UserSummary>) -> Self {
        Self {
            status: STATUS_SUCCESS,
            users: users.into_iter().map(UserSummaryResponse::from).collect(),
        }
    }
}

/// Plain status + message body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS,
            message: message.into(),
        }
    }
}

/// Post with id references
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    /// Owner id
    pub user: String,
    pub image: Option<String>,
    pub caption: Option<String>,
    pub likes: Vec<String>,
    pub comments: Vec<String>,
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            user: post.user_id.to_string(),
            image: post.image,
            caption: post.caption,
            likes: ids(&post.likes),
            comments: ids(&post.comments),
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

/// Comment with id references
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub comment: String,
    pub on_post: String,
    pub posted_by: String,
    pub created_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            comment: comment.comment,
            on_post: comment.post_id.to_string(),
            posted_by: comment.user_id.to_string(),
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

/// Comment with its author populated
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedCommentResponse {
    pub id: String,
    pub comment: String,
    pub on_post: String,
    pub posted_by: UserSummaryResponse,
    pub created_at: String,
}

impl From<CommentWithAuthor> for PopulatedCommentResponse {
    fn from(item: CommentWithAuthor) -> Self {
        Self {
            id: item.comment.id.to_string(),
            comment: item.comment.comment,
            on_post: item.comment.post_id.to_string(),
            posted_by: item.author.into(),
            created_at: item.comment.created_at.to_rfc3339(),
        }
    }
}

/// Post with owner and comments populated
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    pub id: String,
    pub user: UserSummaryResponse,
    pub image: Option<String>,
    pub caption: Option<String>,
    pub likes: Vec<String>,
    pub comments: Vec<PopulatedCommentResponse>,
    pub created_at: String,
}

impl From<PostDetail> for PostDetailResponse {
    fn from(detail: PostDetail) -> Self {
        Self {
            id: detail.post.id.to_string(),
            user: detail.owner.into(),
            image: detail.post.image,
            caption: detail.post.caption,
            likes: ids(&detail.post.likes),
            comments: detail.comments.into_iter().map(Into::into).collect(),
            created_at: detail.post.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostEnvelope<T: Serialize> {
    pub status: &'static str,
    pub post: T,
}

impl<T: Serialize> PostEnvelope<T> {
    pub fn new(post: T) -> Self {
        Self {
            status: STATUS_SUCCESS,
            post,
        }
    }
}

/// Feed page
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub status: &'static str,
    pub results: usize,
    pub posts: Vec<PostResponse>,
}

impl PostListResponse {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            status: STATUS_SUCCESS,
            results: posts.len(),
            posts: posts.into_iter().map(PostResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentEnvelope {
    pub status: &'static str,
    pub comment: CommentResponse,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub status: &'static str,
    pub comments: Vec<PopulatedCommentResponse>,
}

/// Direct-message room
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: String,
    pub participants: Vec<String>,
    pub messages: Vec<String>,
    pub created_at: String,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id.to_string(),
            participants: ids(&room.participants),
            messages: ids(&room.messages),
            created_at: room.created_at.to_rfc3339(),
        }
    }
}

/// Direct message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub id: String,
    pub room_id: String,
    pub sender: String,
    pub receiver: String,
    pub content: String,
    pub seen: bool,
    pub created_at: String,
}

impl From<Message> for ChatMessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            room_id: message.room_id.to_string(),
            sender: message.sender_id.to_string(),
            receiver: message.receiver_id.to_string(),
            content: message.content,
            seen: message.seen,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEnvelope {
    pub room_id: RoomResponse,
}

#[derive(Debug, Serialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomResponse>,
}

#[derive(Debug, Serialize)]
pub struct CreatedMessageResponse {
    pub message: &'static str,
    pub data: ChatMessageResponse,
}

/// Room with its messages
#[derive(Debug, Serialize)]
pub struct RoomMessagesResponse {
    pub room: RoomResponse,
    pub messages: Vec<ChatMessageResponse>,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub messages: Vec<ChatMessageResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessageResponse {
    pub last_message: Option<ChatMessageResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_messages_count: i64,
}

/// Notification joined with actor and post details
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    /// Recipient id
    pub user: String,
    #[serde(rename = "type")]
    pub notification_type: &'static str,
    pub sent_by_id: String,
    pub username: String,
    pub user_profile_image: String,
    pub post_id: Option<String>,
    pub post_image: Option<String>,
    pub comment_id: Option<String>,
    pub comment_text: Option<String>,
    pub seen: bool,
    pub created_at: String,
}

impl From<&NotificationView> for NotificationResponse {
    fn from(view: &NotificationView) -> Self {
        let n = &view.notification;
        Self {
            id: n.id.to_string(),
            user: n.user_id.to_string(),
            notification_type: n.notification_type.as_str(),
            sent_by_id: n.actor_id.to_string(),
            username: view.actor_username.clone(),
            user_profile_image: view.actor_profile_image.clone(),
            post_id: n.post_id.map(|id| id.to_string()),
            post_image: view.post_image.clone(),
            comment_id: n.comment_id.map(|id| id.to_string()),
            comment_text: n.comment_text.clone(),
            seen: n.seen,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub status: &'static str,
    pub notifications: Vec<NotificationResponse>,
}

#[derive(Debug, Serialize)]
pub struct MarkSeenResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub updated: u64,
}

/// Bookmark with the saved post populated
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPostResponse {
    pub id: String,
    pub user: String,
    pub post: PostResponse,
    pub created_at: String,
}

impl From<SavedPostWithPost> for SavedPostResponse {
    fn from(item: SavedPostWithPost) -> Self {
        Self {
            id: item.saved.id.to_string(),
            user: item.saved.user_id.to_string(),
            post: item.post.into(),
            created_at: item.saved.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPostListResponse {
    pub status: &'static str,
    pub saved_posts: Vec<SavedPostResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPostRecordResponse {
    pub id: String,
    pub user: String,
    pub post: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPostEnvelope {
    pub status: &'static str,
    pub saved_post: SavedPostRecordResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Notification, NotificationType};
    use serde_json::json;

    #[test]
    fn test_ids_are_strings() {
        let post = Post {
            likes: vec![9_007_199_254_740_993],
            ..Post::new(1, 2, None, Some("hi".into()))
        };
        let value = serde_json::to_value(PostResponse::from(post)).unwrap();
        assert_eq!(value["likes"], json!(["9007199254740993"]));
        assert_eq!(value["user"], json!("2"));
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_user_response_hides_email_and_hash() {
        let user = User::new(1, "Ann".into(), "ann".into(), "ann@example.com".into(), "hash".into());
        let value = serde_json::to_value(UserResponse::from_user(user, false)).unwrap();
        assert!(value.get("email").is_none());
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("following").is_none());
        assert_eq!(value["profileImage"], json!("default-profile-photo.jpg"));
    }

    #[test]
    fn test_notification_shape() {
        let view = NotificationView {
            notification: Notification::new(5, 1, NotificationType::Like, 2).with_post(3),
            actor_username: "bo".into(),
            actor_profile_image: "bo.jpg".into(),
            post_image: Some("p.jpg".into()),
        };
        let value = serde_json::to_value(NotificationResponse::from(&view)).unwrap();
        assert_eq!(value["type"], json!("like"));
        assert_eq!(value["sentById"], json!("2"));
        assert_eq!(value["postImage"], json!("p.jpg"));
        assert_eq!(value["commentText"], json!(null));
    }
}
