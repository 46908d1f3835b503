//! Title and badge entities.
//!
//! Titles are equippable cosmetics (one equipped at a time, tracked on the
//! user row). Badges are permanent achievement markers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// An equippable user title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Title {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// CSS-ish color hint for rendering, e.g. "#ffd700"
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A permanent achievement badge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for titles and badges.
#[async_trait]
pub trait CosmeticRepository: Send + Sync {
    async fn find_title(&self, id: i64) -> Result<Option<Title>, AppError>;

    async fn create_title(&self, title: &Title) -> Result<Title, AppError>;

    /// Titles a user owns.
    async fn titles_for_user(&self, user_id: i64) -> Result<Vec<Title>, AppError>;

    /// Badges a user has earned.
    async fn badges_for_user(&self, user_id: i64) -> Result<Vec<Badge>, AppError>;

    /// Grant a title to a user. Idempotent.
    async fn grant_title(&self, user_id: i64, title_id: i64) -> Result<(), AppError>;

    /// Grant a badge to a user. Idempotent.
    async fn grant_badge(&self, user_id: i64, badge_id: i64) -> Result<(), AppError>;

    /// Whether the user owns the title.
    async fn user_owns_title(&self, user_id: i64, title_id: i64) -> Result<bool, AppError>;

    /// Whether the user owns the badge.
    async fn user_owns_badge(&self, user_id: i64, badge_id: i64) -> Result<bool, AppError>;
}
