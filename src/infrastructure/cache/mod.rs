//! Cache Module
//!
//! Redis connection management and caching utilities.
//!
//! This module provides:
//! - Redis connection management with automatic reconnection
//! - A generic `Cache` trait for abstracting cache operations
//! - A `RedisCache` implementation backed by the connection manager
//! - A shoutbox presence tracker used for the online list and rain
//! - Predefined key prefixes for consistent cache key naming

mod cache_service;
mod presence_cache;

pub use cache_service::{Cache, RedisCache};
pub use presence_cache::PresenceCacheService;

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Creates a Redis connection manager with automatic reconnection.
///
/// The connection manager handles connection pooling and automatic
/// reconnection when the connection is lost.
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

/// Cache key prefixes for different data types.
///
/// Use these constants to ensure consistent key naming across the application.
pub mod keys {
    /// Prefix for per-user shoutbox presence markers (e.g., "shoutbox:presence:user_id")
    pub const SHOUTBOX_PRESENCE: &str = "shoutbox:presence:";

    /// Set of user ids recently active in the shoutbox
    pub const SHOUTBOX_ONLINE: &str = "shoutbox:online";

    /// Cached forum structure tree
    pub const FORUM_STRUCTURE: &str = "forum:structure";

    /// Prefix for the cached XP leaderboard, keyed by requested size
    pub const LEADERBOARD_XP: &str = "leaderboard:xp:";

    /// Generates a presence key for a user
    #[inline]
    pub fn presence(user_id: impl std::fmt::Display) -> String {
        format!("{}{}", SHOUTBOX_PRESENCE, user_id)
    }

    /// Generates a leaderboard key for a result size
    #[inline]
    pub fn leaderboard(limit: i32) -> String {
        format!("{}{}", LEADERBOARD_XP, limit)
    }
}
