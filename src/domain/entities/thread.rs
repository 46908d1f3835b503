//! Thread entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A discussion thread inside a forum or subforum.
///
/// Maps to the `threads` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - forum_id: BIGINT NOT NULL REFERENCES forum_nodes(id)
/// - author_id: BIGINT NOT NULL REFERENCES users(id)
/// - title: VARCHAR(200) NOT NULL
/// - is_pinned / is_locked: BOOLEAN NOT NULL DEFAULT FALSE
/// - post_count: BIGINT denormalized counter
/// - last_post_at: TIMESTAMPTZ NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: i64,
    pub forum_id: i64,
    pub author_id: i64,
    pub title: String,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub post_count: i64,
    pub last_post_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    /// Whether new posts may be added.
    pub fn accepts_posts(&self) -> bool {
        !self.is_locked
    }
}

/// Repository trait for thread data access.
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Thread>, AppError>;

    async fn create(&self, thread: &Thread) -> Result<Thread, AppError>;

    /// Threads in a forum, pinned first, then most recent activity.
    async fn find_by_forum(
        &self,
        forum_id: i64,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<Thread>, AppError>;

    async fn set_pinned(&self, id: i64, pinned: bool) -> Result<(), AppError>;

    async fn set_locked(&self, id: i64, locked: bool) -> Result<(), AppError>;

    /// Bump the post counter and last activity timestamp.
    async fn record_post(&self, id: i64, at: DateTime<Utc>) -> Result<(), AppError>;
}
