//! Shoutbox Presence Cache
//!
//! Redis-based tracking of who is active in the shoutbox. Every shout and
//! every poll refreshes the caller's presence marker; the resulting set
//! feeds the online list and rain recipient selection.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::keys;
use crate::shared::error::AppError;

/// Shoutbox presence tracker
#[derive(Clone)]
pub struct PresenceCacheService {
    redis: ConnectionManager,
    presence_ttl: u64,
}

impl PresenceCacheService {
    /// Create a presence tracker with the given marker TTL in seconds.
    pub fn new(redis: ConnectionManager, presence_ttl: u64) -> Self {
        Self {
            redis,
            presence_ttl,
        }
    }

    /// Mark a user as present, refreshing their TTL.
    pub async fn touch(&self, user_id: i64) -> Result<(), AppError> {
        let key = keys::presence(user_id);
        let timestamp = chrono::Utc::now().timestamp();

        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(&key, timestamp, self.presence_ttl)
            .await
            .map_err(|e| AppError::Internal(format!("Redis error: {}", e)))?;

        // Also add to the online set for efficient lookups
        conn.sadd::<_, _, ()>(keys::SHOUTBOX_ONLINE, user_id)
            .await
            .map_err(|e| AppError::Internal(format!("Redis error: {}", e)))?;

        // Refresh set TTL
        conn.expire::<_, ()>(keys::SHOUTBOX_ONLINE, self.presence_ttl as i64)
            .await
            .map_err(|e| AppError::Internal(format!("Redis error: {}", e)))?;

        Ok(())
    }

    /// Check if a user is currently present.
    pub async fn is_present(&self, user_id: i64) -> Result<bool, AppError> {
        let key = keys::presence(user_id);

        let mut conn = self.redis.clone();
        let exists: bool = conn
            .exists(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Redis error: {}", e)))?;

        Ok(exists)
    }

    /// All users currently present in the shoutbox.
    ///
    /// Set members whose individual markers have expired are pruned as a
    /// side effect.
    pub async fn present_users(&self) -> Result<Vec<i64>, AppError> {
        let mut conn = self.redis.clone();
        let members: Vec<i64> = conn
            .smembers(keys::SHOUTBOX_ONLINE)
            .await
            .map_err(|e| AppError::Internal(format!("Redis error: {}", e)))?;

        let mut active_users = Vec::new();
        for user_id in members {
            if self.is_present(user_id).await? {
                active_users.push(user_id);
            } else {
                let _: () = conn
                    .srem(keys::SHOUTBOX_ONLINE, user_id)
                    .await
                    .map_err(|e| AppError::Internal(format!("Redis error: {}", e)))?;
            }
        }

        Ok(active_users)
    }

    /// Remove a user's presence marker (logout, mute).
    pub async fn clear(&self, user_id: i64) -> Result<(), AppError> {
        let key = keys::presence(user_id);

        let mut conn = self.redis.clone();
        let _: () = conn
            .del(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Redis error: {}", e)))?;
        let _: () = conn
            .srem(keys::SHOUTBOX_ONLINE, user_id)
            .await
            .map_err(|e| AppError::Internal(format!("Redis error: {}", e)))?;

        Ok(())
    }
}
