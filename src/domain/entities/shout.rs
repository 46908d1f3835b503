//! Shout entity and repository trait.
//!
//! The shoutbox is a single global room. Clients poll for new shouts after
//! a cursor id instead of holding a socket open.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Shout kind matching the PostgreSQL ENUM `shout_kind`.
///
/// System, tip and rain shouts are emitted by the server itself to announce
/// economy events in the shoutbox feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShoutKind {
    #[default]
    User,
    System,
    Tip,
    Rain,
}

impl ShoutKind {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "system" => Self::System,
            "tip" => Self::Tip,
            "rain" => Self::Rain,
            _ => Self::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
            Self::Tip => "tip",
            Self::Rain => "rain",
        }
    }
}

/// A message in the global shoutbox.
///
/// `author_id` is None for server-emitted shouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shout {
    pub id: i64,
    pub author_id: Option<i64>,
    pub kind: ShoutKind,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for shoutbox data access.
#[async_trait]
pub trait ShoutRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Shout>, AppError>;

    async fn create(&self, shout: &Shout) -> Result<Shout, AppError>;

    /// Most recent shouts, newest first.
    async fn find_recent(&self, limit: i32) -> Result<Vec<Shout>, AppError>;

    /// Shouts with id greater than `after`, oldest first. This is the
    /// polling path.
    async fn find_after(&self, after: i64, limit: i32) -> Result<Vec<Shout>, AppError>;

    /// Soft-delete a shout (moderation).
    async fn soft_delete(&self, id: i64) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            ShoutKind::User,
            ShoutKind::System,
            ShoutKind::Tip,
            ShoutKind::Rain,
        ] {
            assert_eq!(ShoutKind::from_str(kind.as_str()), kind);
        }
    }
}
