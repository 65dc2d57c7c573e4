//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! This module provides concrete implementations of the repository traits
//! defined in the domain layer. Each repository handles data access for
//! a specific entity type.
//!
//! ## Available Repositories
//!
//! - **UserRepository** - User accounts and the follow graph
//! - **PostRepository** - Posts and likes
//! - **CommentRepository** - Comments with resolved authors
//! - **RoomRepository** - Direct-message rooms keyed by participant pair
//! - **MessageRepository** - Room messages and read receipts
//! - **NotificationRepository** - Activity notifications
//! - **SavedPostRepository** - Post bookmarks
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgPostRepository, PgUserRepository};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let user_repo = PgUserRepository::new(pool.clone());
//!     let post_repo = PgPostRepository::new(pool.clone());
//! }
//! ```

pub mod comment_repository;
pub mod message_repository;
pub mod notification_repository;
pub mod post_repository;
pub mod room_repository;
pub mod saved_post_repository;
pub mod user_repository;

pub use comment_repository::PgCommentRepository;
pub use message_repository::PgMessageRepository;
pub use notification_repository::PgNotificationRepository;
pub use post_repository::PgPostRepository;
pub use room_repository::PgRoomRepository;
pub use saved_post_repository::PgSavedPostRepository;
pub use user_repository::PgUserRepository;
