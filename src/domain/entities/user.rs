//! User entity and repository trait.
//!
//! Maps to the `users` table. The follow graph lives in `follows`; the id
//! lists carried by [`UserProfile`] are derived from the relationship tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Profile image assigned at signup until the user picks one.
pub const DEFAULT_PROFILE_IMAGE: &str = "default-profile-photo.jpg";

/// Represents a user account.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - name: VARCHAR(64) NOT NULL
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - profile_image: TEXT NOT NULL
/// - created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Full display name
    pub name: String,

    /// Username (2-32 characters, unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Profile image file name or URL
    pub profile_image: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh account with the default profile image.
    pub fn new(id: i64, name: String, username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            username,
            email,
            password_hash,
            profile_image: DEFAULT_PROFILE_IMAGE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A user together with every relationship list of the account.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user: User,
    /// Users this account follows
    pub following: Vec<i64>,
    /// Users following this account
    pub followers: Vec<i64>,
    /// Posts owned by the user, newest first
    pub posts: Vec<i64>,
    /// Posts the user liked
    pub liked: Vec<i64>,
    /// Comments the user wrote
    pub commented: Vec<i64>,
    /// Direct-message rooms the user participates in
    pub rooms: Vec<i64>,
    /// Saved-post records of the user
    pub saved_posts: Vec<i64>,
}

/// Compact user representation embedded in other resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub profile_image: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}

/// Repository trait for User data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by username (login key).
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Load a user with all relationship id lists.
    async fn find_profile(&self, id: i64) -> Result<Option<UserProfile>, AppError>;

    /// Create a new user. Unique violations surface as `AppError::Conflict`.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// Record `follower_id` following `followee_id`.
    ///
    /// Returns false when the relationship already existed.
    async fn add_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError>;

    /// Returns false when there was nothing to remove.
    async fn remove_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError>;

    async fn list_followers(&self, user_id: i64) -> Result<Vec<UserSummary>, AppError>;

    async fn list_following(&self, user_id: i64) -> Result<Vec<UserSummary>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_gets_default_profile_image() {
        let user = User::new(1, "Ann".into(), "ann".into(), "ann@example.com".into(), "hash".into());
        assert_eq!(user.profile_image, DEFAULT_PROFILE_IMAGE);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new(1, "Ann".into(), "ann".into(), "ann@example.com".into(), "secret-hash".into());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_summary_from_user() {
        let user = User::new(7, "Bo".into(), "bo".into(), "bo@example.com".into(), "h".into());
        let summary = UserSummary::from(&user);
        assert_eq!(summary.id, 7);
        assert_eq!(summary.username, "bo");
    }
}
