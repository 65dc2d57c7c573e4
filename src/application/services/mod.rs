//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Signup, login, bearer tokens
//! - **UserService**: Profiles and the follow graph
//! - **PostService**: Posts, feeds and likes
//! - **CommentService**: Comments on posts
//! - **RoomService**: Direct-message rooms and messages
//! - **NotificationService**: Activity notifications and live delivery
//! - **SavedPostService**: Post bookmarks

pub mod auth_service;
pub mod comment_service;
pub mod notification_service;
pub mod post_service;
pub mod room_service;
pub mod saved_post_service;
pub mod user_service;

// Re-export auth service types
pub use auth_service::{
    issue_token, verify_token, AuthError, AuthService, AuthServiceImpl, AuthToken, Claims, SignupInput,
};

// Re-export user service types
pub use user_service::{UserError, UserService, UserServiceImpl};

// Re-export post service types
pub use post_service::{PostDetail, PostError, PostService, PostServiceImpl};

// Re-export comment service types
pub use comment_service::{CommentError, CommentService, CommentServiceImpl};

// Re-export room service types
pub use room_service::{RoomError, RoomService, RoomServiceImpl};

// Re-export notification service types
pub use notification_service::{
    NotificationDispatcher, NotificationError, NotificationEvent, NotificationService,
    NotificationServiceImpl,
};

// Re-export saved post service types
pub use saved_post_service::{SavedPostError, SavedPostService, SavedPostServiceImpl};
