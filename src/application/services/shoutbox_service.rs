//! Shoutbox Service
//!
//! The global chat room. Clients poll with a cursor instead of holding a
//! socket; every shout and poll refreshes the caller's presence marker so
//! the online list and rain eligibility stay current.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::economy_service::{EconomyService, XpAction, XpAward};
use crate::domain::{Shout, ShoutKind, ShoutRepository, User};
use crate::infrastructure::cache::PresenceCacheService;
use crate::shared::snowflake::SnowflakeGenerator;

/// Shoutbox service errors
#[derive(Debug, thiserror::Error)]
pub enum ShoutboxError {
    #[error("Shout not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Shoutbox service trait for dependency injection
#[async_trait]
pub trait ShoutboxService: Send + Sync {
    /// Post a user shout, refresh presence, and award shout XP.
    async fn shout(&self, author: &User, content: &str) -> Result<(Shout, XpAward), ShoutboxError>;

    /// Emit a server shout announcing an economy event.
    async fn emit_system_shout(
        &self,
        kind: ShoutKind,
        content: &str,
    ) -> Result<Shout, ShoutboxError>;

    /// Most recent shouts, newest first (initial page load).
    async fn recent(&self, limit: i32) -> Result<Vec<Shout>, ShoutboxError>;

    /// Shouts after a cursor, oldest first (polling). Refreshes the
    /// caller's presence when one is given.
    async fn poll(
        &self,
        caller_id: Option<i64>,
        after: i64,
        limit: i32,
    ) -> Result<Vec<Shout>, ShoutboxError>;

    /// User ids currently present in the shoutbox.
    async fn online(&self) -> Result<Vec<i64>, ShoutboxError>;
}

/// ShoutboxService implementation
pub struct ShoutboxServiceImpl<S, E>
where
    S: ShoutRepository,
    E: EconomyService,
{
    shout_repo: Arc<S>,
    economy: Arc<E>,
    presence: PresenceCacheService,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<S, E> ShoutboxServiceImpl<S, E>
where
    S: ShoutRepository,
    E: EconomyService,
{
    pub fn new(
        shout_repo: Arc<S>,
        economy: Arc<E>,
        presence: PresenceCacheService,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            shout_repo,
            economy,
            presence,
            id_generator,
        }
    }
}

#[async_trait]
impl<S, E> ShoutboxService for ShoutboxServiceImpl<S, E>
where
    S: ShoutRepository + 'static,
    E: EconomyService + 'static,
{
    async fn shout(&self, author: &User, content: &str) -> Result<(Shout, XpAward), ShoutboxError> {
        let shout = Shout {
            id: self.id_generator.generate(),
            author_id: Some(author.id),
            kind: ShoutKind::User,
            content: content.to_string(),
            is_deleted: false,
            created_at: Utc::now(),
        };

        let created = self
            .shout_repo
            .create(&shout)
            .await
            .map_err(|e| ShoutboxError::Internal(e.to_string()))?;

        self.presence
            .touch(author.id)
            .await
            .map_err(|e| ShoutboxError::Internal(e.to_string()))?;

        let award = self
            .economy
            .award_xp(author, XpAction::Shout, None)
            .await
            .map_err(|e| ShoutboxError::Internal(e.to_string()))?;

        Ok((created, award))
    }

    async fn emit_system_shout(
        &self,
        kind: ShoutKind,
        content: &str,
    ) -> Result<Shout, ShoutboxError> {
        let shout = Shout {
            id: self.id_generator.generate(),
            author_id: None,
            kind,
            content: content.to_string(),
            is_deleted: false,
            created_at: Utc::now(),
        };

        self.shout_repo
            .create(&shout)
            .await
            .map_err(|e| ShoutboxError::Internal(e.to_string()))
    }

    async fn recent(&self, limit: i32) -> Result<Vec<Shout>, ShoutboxError> {
        self.shout_repo
            .find_recent(limit)
            .await
            .map_err(|e| ShoutboxError::Internal(e.to_string()))
    }

    async fn poll(
        &self,
        caller_id: Option<i64>,
        after: i64,
        limit: i32,
    ) -> Result<Vec<Shout>, ShoutboxError> {
        if let Some(user_id) = caller_id {
            self.presence
                .touch(user_id)
                .await
                .map_err(|e| ShoutboxError::Internal(e.to_string()))?;
        }

        self.shout_repo
            .find_after(after, limit)
            .await
            .map_err(|e| ShoutboxError::Internal(e.to_string()))
    }

    async fn online(&self) -> Result<Vec<i64>, ShoutboxError> {
        self.presence
            .present_users()
            .await
            .map_err(|e| ShoutboxError::Internal(e.to_string()))
    }
}
