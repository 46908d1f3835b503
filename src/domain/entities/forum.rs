//! Forum node entity and repository trait.
//!
//! The forum hierarchy is a single self-referential table. Zones sit at the
//! top, forums under zones, subforums under forums.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Node kind matching the PostgreSQL ENUM `forum_node_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Zone,
    Forum,
    Subforum,
}

impl NodeKind {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "zone" => Self::Zone,
            "subforum" => Self::Subforum,
            _ => Self::Forum,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zone => "zone",
            Self::Forum => "forum",
            Self::Subforum => "subforum",
        }
    }

    /// Threads can only be created in forums and subforums, never zones.
    pub fn accepts_threads(&self) -> bool {
        !matches!(self, Self::Zone)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in the forum hierarchy.
///
/// Maps to the `forum_nodes` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - parent_id: BIGINT NULL (NULL for zones)
/// - kind: forum_node_kind NOT NULL
/// - name: VARCHAR(100) NOT NULL
/// - slug: VARCHAR(100) NOT NULL UNIQUE
/// - description: TEXT NULL
/// - position: INT NOT NULL DEFAULT 0
/// - xp_multiplier: DOUBLE PRECISION NOT NULL DEFAULT 1.0
/// - is_locked: BOOLEAN NOT NULL DEFAULT FALSE
/// - thread_count / post_count: BIGINT denormalized counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumNode {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub kind: NodeKind,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    /// Forum-level XP multiplier, sanitized before use
    pub xp_multiplier: f64,
    /// Locked nodes accept no new threads
    pub is_locked: bool,
    pub thread_count: i64,
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for forum hierarchy data access.
#[async_trait]
pub trait ForumNodeRepository: Send + Sync {
    /// Find a node by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<ForumNode>, AppError>;

    /// Find a node by its slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<ForumNode>, AppError>;

    /// All nodes, unordered. The structure builder arranges them.
    async fn find_all(&self) -> Result<Vec<ForumNode>, AppError>;

    /// Create a new node.
    async fn create(&self, node: &ForumNode) -> Result<ForumNode, AppError>;

    /// Update name, description, position, multiplier and lock flag.
    async fn update(&self, node: &ForumNode) -> Result<ForumNode, AppError>;

    /// Delete a node. Fails if it still has children.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Check whether a slug is already taken.
    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError>;

    /// Bump the denormalized counters after a thread or post is created.
    async fn increment_counts(
        &self,
        id: i64,
        thread_delta: i64,
        post_delta: i64,
    ) -> Result<(), AppError>;
}
