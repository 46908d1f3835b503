//! Economy Service
//!
//! The XP award pipeline: base XP for an action, the sanitized role and
//! forum multipliers, integer truncation, and level recomputation. Every
//! XP-earning action in the application funnels through this service.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::EconomySettings;
use crate::domain::services::{multiplier, MultiplierOutcome};
use crate::domain::{ForumNode, User, UserRepository};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Actions that earn XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpAction {
    CreateThread,
    CreatePost,
    Shout,
}

impl XpAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateThread => "thread",
            Self::CreatePost => "post",
            Self::Shout => "shout",
        }
    }
}

/// Result of an XP award.
#[derive(Debug, Clone, Serialize)]
pub struct XpAward {
    pub xp_awarded: i64,
    pub new_total_xp: i64,
    pub new_level: i32,
    pub leveled_up: bool,
    pub multiplier: MultiplierOutcome,
}

/// Economy service trait for dependency injection
#[async_trait]
pub trait EconomyService: Send + Sync {
    /// Award XP to a user for an action, applying sanitized multipliers.
    ///
    /// `forum` carries the forum-level multiplier for thread/post actions;
    /// pass None for actions outside the forum tree (shouts).
    async fn award_xp(
        &self,
        user: &User,
        action: XpAction,
        forum: Option<&ForumNode>,
    ) -> Result<XpAward, AppError>;
}

/// EconomyService implementation
pub struct EconomyServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    settings: EconomySettings,
}

impl<U> EconomyServiceImpl<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, settings: EconomySettings) -> Self {
        Self {
            user_repo,
            settings,
        }
    }

    fn base_xp(&self, action: XpAction) -> i64 {
        match action {
            XpAction::CreateThread => self.settings.thread_xp,
            XpAction::CreatePost => self.settings.post_xp,
            XpAction::Shout => self.settings.shout_xp,
        }
    }
}

#[async_trait]
impl<U> EconomyService for EconomyServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn award_xp(
        &self,
        user: &User,
        action: XpAction,
        forum: Option<&ForumNode>,
    ) -> Result<XpAward, AppError> {
        let policy = self.settings.policy();
        let role_multiplier = self.settings.role_multiplier(user.role);
        let forum_multiplier = forum.map(|f| f.xp_multiplier).unwrap_or(1.0);

        let outcome = multiplier::sanitize_multipliers(role_multiplier, forum_multiplier, &policy);
        if outcome.has_violations() {
            metrics::record_multiplier_violation(policy.enforcement.as_str());
        }

        // Truncate toward zero; fractional XP is never awarded
        let xp_awarded = (self.base_xp(action) as f64 * outcome.final_multiplier) as i64;

        // The repository recomputes the level from the stored total, so a
        // stale caller snapshot cannot understate it
        let updated = self.user_repo.add_xp(user.id, xp_awarded).await?;
        let leveled_up = updated.level > user.level;

        metrics::record_xp_award(action.as_str(), xp_awarded, leveled_up);

        if leveled_up {
            tracing::info!(
                user_id = user.id,
                level = updated.level,
                "User leveled up"
            );
        }

        Ok(XpAward {
            xp_awarded,
            new_total_xp: updated.xp,
            new_level: updated.level,
            leveled_up,
            multiplier: outcome,
        })
    }
}
