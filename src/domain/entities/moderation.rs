//! Moderation action audit log.
//!
//! Every moderator/admin action writes an immutable `mod_actions` row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Action kind matching the PostgreSQL ENUM `mod_action_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModActionKind {
    DeletePost,
    LockThread,
    UnlockThread,
    PinThread,
    UnpinThread,
    DeleteShout,
    SetRole,
    AdjustBalance,
    GrantTitle,
}

impl ModActionKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "delete_post" => Some(Self::DeletePost),
            "lock_thread" => Some(Self::LockThread),
            "unlock_thread" => Some(Self::UnlockThread),
            "pin_thread" => Some(Self::PinThread),
            "unpin_thread" => Some(Self::UnpinThread),
            "delete_shout" => Some(Self::DeleteShout),
            "set_role" => Some(Self::SetRole),
            "adjust_balance" => Some(Self::AdjustBalance),
            "grant_title" => Some(Self::GrantTitle),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeletePost => "delete_post",
            Self::LockThread => "lock_thread",
            Self::UnlockThread => "unlock_thread",
            Self::PinThread => "pin_thread",
            Self::UnpinThread => "unpin_thread",
            Self::DeleteShout => "delete_shout",
            Self::SetRole => "set_role",
            Self::AdjustBalance => "adjust_balance",
            Self::GrantTitle => "grant_title",
        }
    }
}

/// One row in the moderation audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModAction {
    pub id: i64,
    /// The moderator or admin who acted
    pub actor_id: i64,
    pub kind: ModActionKind,
    /// The user affected, when the action targets a user
    pub target_user_id: Option<i64>,
    /// The post/thread/shout affected, when the action targets content
    pub target_id: Option<i64>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for the moderation audit log.
#[async_trait]
pub trait ModActionRepository: Send + Sync {
    async fn create(&self, action: &ModAction) -> Result<ModAction, AppError>;

    /// Recent actions, newest first, keyset-paginated by id.
    async fn find_recent(
        &self,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<ModAction>, AppError>;
}
