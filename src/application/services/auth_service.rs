//! Authentication Service
//!
//! Handles signup, login and bearer token issuance/validation.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::domain::{User, UserRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and sign them in
    async fn signup(&self, input: SignupInput) -> Result<(User, AuthToken), AuthError>;

    /// Authenticate user with username and password
    async fn login(&self, username: &str, password: &str) -> Result<(User, AuthToken), AuthError>;
}

/// Signup fields after request validation
#[derive(Debug, Clone)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Bearer token handed to the client
#[derive(Debug, Clone, Serialize)]
pub struct AuthToken {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Token ID
    pub jti: String,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Email already exists")]
    EmailExists,

    #[error("Username already exists")]
    UsernameExists,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::TokenExpired | AuthError::InvalidToken => {
                AppError::Unauthorized(err.to_string())
            }
            AuthError::EmailExists | AuthError::UsernameExists => AppError::Conflict(err.to_string()),
            AuthError::Internal(msg) => AppError::Internal(msg),
            AuthError::Repository(e) => e,
        }
    }
}

/// Sign a bearer token for `user_id`.
pub fn issue_token(settings: &JwtSettings, user_id: i64) -> Result<AuthToken, AuthError> {
    let now = Utc::now();
    let expiry = now + Duration::minutes(settings.access_token_expiry_minutes);

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiry.timestamp(),
        iat: now.timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
    };

    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(AuthToken {
        access_token,
        expires_in: settings.access_token_expiry_minutes * 60,
        token_type: "Bearer".to_string(),
    })
}

/// Verify a bearer token and return the user id it was issued for.
pub fn verify_token(secret: &str, token: &str) -> Result<i64, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    token_data
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| AuthError::InvalidToken)
}

/// AuthService implementation
pub struct AuthServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    id_generator: Arc<SnowflakeGenerator>,
    jwt_settings: JwtSettings,
}

impl<U> AuthServiceImpl<U>
where
    U: UserRepository,
{
    /// Create a new AuthServiceImpl
    pub fn new(user_repo: Arc<U>, id_generator: Arc<SnowflakeGenerator>, jwt_settings: JwtSettings) -> Self {
        Self {
            user_repo,
            id_generator,
            jwt_settings,
        }
    }

    /// Hash a password using Argon2id
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against its hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[async_trait]
impl<U> AuthService for AuthServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn signup(&self, input: SignupInput) -> Result<(User, AuthToken), AuthError> {
        if self.user_repo.email_exists(&input.email).await? {
            return Err(AuthError::EmailExists);
        }

        if self.user_repo.username_exists(&input.username).await? {
            return Err(AuthError::UsernameExists);
        }

        let password_hash = self.hash_password(&input.password)?;
        let user = User::new(
            self.id_generator.generate(),
            input.name,
            input.username,
            input.email,
            password_hash,
        );

        // Unique violations from a concurrent signup surface as Conflict.
        let created = self.user_repo.create(&user).await?;
        let token = issue_token(&self.jwt_settings, created.id)?;

        tracing::info!(user_id = created.id, "User signed up");
        Ok((created, token))
    }

    async fn login(&self, username: &str, password: &str) -> Result<(User, AuthToken), AuthError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = issue_token(&self.jwt_settings, user.id)?;
        Ok((user, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockUserRepository;
    use fake::faker::internet::en::{SafeEmail, Username};
    use fake::Fake;
    use pretty_assertions::assert_eq;

    fn jwt_settings() -> JwtSettings {
        JwtSettings {
            secret: "unit-test-secret-that-is-long-enough-0123".to_string(),
            access_token_expiry_minutes: 15,
        }
    }

    fn service(repo: MockUserRepository) -> AuthServiceImpl<MockUserRepository> {
        AuthServiceImpl::new(Arc::new(repo), Arc::new(SnowflakeGenerator::new(1)), jwt_settings())
    }

    fn signup_input() -> SignupInput {
        SignupInput {
            name: "Test User".to_string(),
            email: SafeEmail().fake(),
            username: Username().fake(),
            password: "correct horse battery".to_string(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let settings = jwt_settings();
        let token = issue_token(&settings, 42).unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 900);
        assert_eq!(verify_token(&settings.secret, &token.access_token).unwrap(), 42);
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let token = issue_token(&jwt_settings(), 42).unwrap();
        let err = verify_token("some-other-secret-that-is-long-enough!!", &token.access_token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let settings = JwtSettings {
            access_token_expiry_minutes: -10,
            ..jwt_settings()
        };
        let token = issue_token(&settings, 42).unwrap();
        let err = verify_token(&settings.secret, &token.access_token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().returning(|_| Ok(true));
        repo.expect_create().times(0);

        let err = service(repo).signup(signup_input()).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailExists));
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_username() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_username_exists().returning(|_| Ok(true));
        repo.expect_create().times(0);

        let err = service(repo).signup(signup_input()).await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameExists));
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let input = signup_input();
        let password = input.password.clone();

        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_username_exists().returning(|_| Ok(false));
        repo.expect_create().times(1).returning(|user| Ok(user.clone()));

        let (user, token) = service(repo).signup(input).await.unwrap();
        assert_ne!(user.password_hash, password);
        assert!(user.password_hash.starts_with("$argon2"));
        assert_eq!(verify_token(&jwt_settings().secret, &token.access_token).unwrap(), user.id);

        let stored = user.clone();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(move |_| Ok(Some(stored.clone())));

        let (logged_in, _) = service(repo).login(&user.username, &password).await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_username_exists().returning(|_| Ok(false));
        repo.expect_create().returning(|user| Ok(user.clone()));
        let (user, _) = service(repo).signup(signup_input()).await.unwrap();

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let err = service(repo).login("whoever", "not the password").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));

        let err = service(repo).login("ghost", "whatever123").await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Unauthorized(_)));
    }
}
