//! Moderation Service
//!
//! Moderator and admin actions. Every action writes an immutable audit row
//! before returning; the audit write is part of the action, not an
//! afterthought.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::value_objects::DgtAmount;
use crate::domain::{
    ModAction, ModActionKind, ModActionRepository, PostRepository, ShoutRepository,
    ThreadRepository, UserRepository, UserRole, WalletRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Moderation service errors
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("Target not found")]
    TargetNotFound,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for ModerationError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::NotFound(_) => ModerationError::TargetNotFound,
            AppError::InsufficientBalance => ModerationError::InsufficientBalance,
            e => ModerationError::Internal(e.to_string()),
        }
    }
}

/// Moderation service trait for dependency injection
#[async_trait]
pub trait ModerationService: Send + Sync {
    /// Soft-delete a post.
    async fn delete_post(
        &self,
        actor_id: i64,
        post_id: i64,
        reason: Option<&str>,
    ) -> Result<(), ModerationError>;

    /// Lock or unlock a thread.
    async fn set_thread_locked(
        &self,
        actor_id: i64,
        thread_id: i64,
        locked: bool,
        reason: Option<&str>,
    ) -> Result<(), ModerationError>;

    /// Pin or unpin a thread.
    async fn set_thread_pinned(
        &self,
        actor_id: i64,
        thread_id: i64,
        pinned: bool,
        reason: Option<&str>,
    ) -> Result<(), ModerationError>;

    /// Soft-delete a shout.
    async fn delete_shout(
        &self,
        actor_id: i64,
        shout_id: i64,
        reason: Option<&str>,
    ) -> Result<(), ModerationError>;

    /// Adjust a user's DGT balance (admin). Returns the new balance.
    async fn adjust_balance(
        &self,
        actor_id: i64,
        user_id: i64,
        delta: DgtAmount,
        reason: &str,
    ) -> Result<DgtAmount, ModerationError>;

    /// Change a user's role (admin).
    async fn set_role(
        &self,
        actor_id: i64,
        user_id: i64,
        role: UserRole,
    ) -> Result<(), ModerationError>;

    /// Grant a title outside the shop (admin).
    async fn grant_title(
        &self,
        actor_id: i64,
        user_id: i64,
        title_id: i64,
    ) -> Result<(), ModerationError>;

    /// Recent audit log entries, newest first.
    async fn audit_log(
        &self,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<ModAction>, ModerationError>;
}

/// ModerationService implementation
pub struct ModerationServiceImpl<M, P, T, S, U, W, C>
where
    M: ModActionRepository,
    P: PostRepository,
    T: ThreadRepository,
    S: ShoutRepository,
    U: UserRepository,
    W: WalletRepository,
    C: crate::domain::CosmeticRepository,
{
    action_repo: Arc<M>,
    post_repo: Arc<P>,
    thread_repo: Arc<T>,
    shout_repo: Arc<S>,
    user_repo: Arc<U>,
    wallet_repo: Arc<W>,
    cosmetic_repo: Arc<C>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<M, P, T, S, U, W, C> ModerationServiceImpl<M, P, T, S, U, W, C>
where
    M: ModActionRepository,
    P: PostRepository,
    T: ThreadRepository,
    S: ShoutRepository,
    U: UserRepository,
    W: WalletRepository,
    C: crate::domain::CosmeticRepository,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        action_repo: Arc<M>,
        post_repo: Arc<P>,
        thread_repo: Arc<T>,
        shout_repo: Arc<S>,
        user_repo: Arc<U>,
        wallet_repo: Arc<W>,
        cosmetic_repo: Arc<C>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            action_repo,
            post_repo,
            thread_repo,
            shout_repo,
            user_repo,
            wallet_repo,
            cosmetic_repo,
            id_generator,
        }
    }

    /// Write the audit row for a completed action.
    async fn record(
        &self,
        actor_id: i64,
        kind: ModActionKind,
        target_user_id: Option<i64>,
        target_id: Option<i64>,
        reason: Option<&str>,
    ) -> Result<(), ModerationError> {
        let action = ModAction {
            id: self.id_generator.generate(),
            actor_id,
            kind,
            target_user_id,
            target_id,
            reason: reason.map(str::to_string),
            created_at: Utc::now(),
        };

        self.action_repo.create(&action).await?;

        tracing::info!(
            actor_id,
            kind = kind.as_str(),
            ?target_user_id,
            ?target_id,
            "Moderation action recorded"
        );

        Ok(())
    }
}

#[async_trait]
impl<M, P, T, S, U, W, C> ModerationService for ModerationServiceImpl<M, P, T, S, U, W, C>
where
    M: ModActionRepository + 'static,
    P: PostRepository + 'static,
    T: ThreadRepository + 'static,
    S: ShoutRepository + 'static,
    U: UserRepository + 'static,
    W: WalletRepository + 'static,
    C: crate::domain::CosmeticRepository + 'static,
{
    async fn delete_post(
        &self,
        actor_id: i64,
        post_id: i64,
        reason: Option<&str>,
    ) -> Result<(), ModerationError> {
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await?
            .ok_or(ModerationError::TargetNotFound)?;

        self.post_repo.soft_delete(post_id).await?;
        self.record(
            actor_id,
            ModActionKind::DeletePost,
            Some(post.author_id),
            Some(post_id),
            reason,
        )
        .await
    }

    async fn set_thread_locked(
        &self,
        actor_id: i64,
        thread_id: i64,
        locked: bool,
        reason: Option<&str>,
    ) -> Result<(), ModerationError> {
        self.thread_repo.set_locked(thread_id, locked).await?;

        let kind = if locked {
            ModActionKind::LockThread
        } else {
            ModActionKind::UnlockThread
        };
        self.record(actor_id, kind, None, Some(thread_id), reason)
            .await
    }

    async fn set_thread_pinned(
        &self,
        actor_id: i64,
        thread_id: i64,
        pinned: bool,
        reason: Option<&str>,
    ) -> Result<(), ModerationError> {
        self.thread_repo.set_pinned(thread_id, pinned).await?;

        let kind = if pinned {
            ModActionKind::PinThread
        } else {
            ModActionKind::UnpinThread
        };
        self.record(actor_id, kind, None, Some(thread_id), reason)
            .await
    }

    async fn delete_shout(
        &self,
        actor_id: i64,
        shout_id: i64,
        reason: Option<&str>,
    ) -> Result<(), ModerationError> {
        let shout = self
            .shout_repo
            .find_by_id(shout_id)
            .await?
            .ok_or(ModerationError::TargetNotFound)?;

        self.shout_repo.soft_delete(shout_id).await?;
        self.record(
            actor_id,
            ModActionKind::DeleteShout,
            shout.author_id,
            Some(shout_id),
            reason,
        )
        .await
    }

    async fn adjust_balance(
        &self,
        actor_id: i64,
        user_id: i64,
        delta: DgtAmount,
        reason: &str,
    ) -> Result<DgtAmount, ModerationError> {
        let tx_id = self.id_generator.generate();
        let new_balance = self
            .wallet_repo
            .adjust(user_id, delta, tx_id, reason)
            .await?;

        self.record(
            actor_id,
            ModActionKind::AdjustBalance,
            Some(user_id),
            None,
            Some(reason),
        )
        .await?;

        Ok(new_balance)
    }

    async fn set_role(
        &self,
        actor_id: i64,
        user_id: i64,
        role: UserRole,
    ) -> Result<(), ModerationError> {
        self.user_repo.set_role(user_id, role).await?;
        self.record(
            actor_id,
            ModActionKind::SetRole,
            Some(user_id),
            None,
            Some(role.as_str()),
        )
        .await
    }

    async fn grant_title(
        &self,
        actor_id: i64,
        user_id: i64,
        title_id: i64,
    ) -> Result<(), ModerationError> {
        self.cosmetic_repo
            .find_title(title_id)
            .await?
            .ok_or(ModerationError::TargetNotFound)?;

        self.cosmetic_repo.grant_title(user_id, title_id).await?;
        self.record(
            actor_id,
            ModActionKind::GrantTitle,
            Some(user_id),
            Some(title_id),
            None,
        )
        .await
    }

    async fn audit_log(
        &self,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<ModAction>, ModerationError> {
        Ok(self.action_repo.find_recent(limit, before).await?)
    }
}
