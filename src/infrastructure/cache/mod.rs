//! Cache Module
//!
//! Redis connection management. Redis backs the distributed rate limiter;
//! nothing else in the service keeps state there.

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Creates a Redis connection manager with automatic reconnection.
///
/// # Example
/// ```rust,ignore
/// let settings = RedisSettings { url: "redis://localhost:6379".into() };
/// let conn = create_redis_client(&settings).await?;
/// ```
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_redis_client(
    settings: &RedisSettings,
) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(settings.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}

/// Cache key prefixes.
pub mod keys {
    /// Prefix for rate limiting windows (e.g., "ratelimit:api:user:42")
    pub const RATE_LIMIT: &str = "ratelimit:";

    /// Generates a rate limit key for a bucket and client identity
    #[inline]
    pub fn rate_limit(bucket: &str, identity: impl std::fmt::Display) -> String {
        format!("{}{}:{}", RATE_LIMIT, bucket, identity)
    }
}
