//! # Domain Entities
//!
//! Core domain entities of the social API. All entities map directly to
//! their database tables.
//!
//! ## Core Entities
//!
//! - **User**: Account with credentials, profile image and follow graph
//! - **Post**: Photo post with caption, likes and comments
//! - **Comment**: Text comment on a post
//! - **Room**: Direct-message room between two users
//! - **Message**: Message inside a room
//!
//! ## Supporting Entities
//!
//! - **Notification**: Like, comment and follow activity for a recipient
//! - **SavedPost**: A user's bookmark of a post
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod comment;
mod message;
mod notification;
mod post;
mod room;
mod saved_post;
mod user;

pub use user::{User, UserProfile, UserRepository, UserSummary, DEFAULT_PROFILE_IMAGE};

pub use post::{clamp_limit, Post, PostRepository, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub use comment::{Comment, CommentRepository, CommentWithAuthor};

pub use room::{Room, RoomRepository};

pub use message::{Message, MessageRepository, MAX_MESSAGE_LENGTH};

pub use notification::{Notification, NotificationRepository, NotificationType, NotificationView};

pub use saved_post::{SavedPost, SavedPostRepository, SavedPostWithPost};

#[cfg(test)]
pub use comment::MockCommentRepository;
#[cfg(test)]
pub use message::MockMessageRepository;
#[cfg(test)]
pub use notification::MockNotificationRepository;
#[cfg(test)]
pub use post::MockPostRepository;
#[cfg(test)]
pub use room::MockRoomRepository;
#[cfg(test)]
pub use saved_post::MockSavedPostRepository;
#[cfg(test)]
pub use user::MockUserRepository;
