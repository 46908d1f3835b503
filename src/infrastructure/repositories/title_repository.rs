//! Cosmetic Repository Implementation
//!
//! PostgreSQL implementation of the CosmeticRepository trait covering
//! titles, badges, and ownership rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Badge, CosmeticRepository, Title};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct TitleRow {
    id: i64,
    name: String,
    description: Option<String>,
    color: Option<String>,
    created_at: DateTime<Utc>,
}

impl TitleRow {
    fn into_title(self) -> Title {
        Title {
            id: self.id,
            name: self.name,
            description: self.description,
            color: self.color,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BadgeRow {
    id: i64,
    name: String,
    description: Option<String>,
    icon_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl BadgeRow {
    fn into_badge(self) -> Badge {
        Badge {
            id: self.id,
            name: self.name,
            description: self.description,
            icon_url: self.icon_url,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL cosmetic repository implementation.
#[derive(Clone)]
pub struct PgCosmeticRepository {
    pool: PgPool,
}

impl PgCosmeticRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CosmeticRepository for PgCosmeticRepository {
    async fn find_title(&self, id: i64) -> Result<Option<Title>, AppError> {
        let row = sqlx::query_as::<_, TitleRow>(
            "SELECT id, name, description, color, created_at FROM titles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_title()))
    }

    async fn create_title(&self, title: &Title) -> Result<Title, AppError> {
        let row = sqlx::query_as::<_, TitleRow>(
            r#"
            INSERT INTO titles (id, name, description, color)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, color, created_at
            "#,
        )
        .bind(title.id)
        .bind(&title.name)
        .bind(&title.description)
        .bind(&title.color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("Title '{}' already exists", title.name))
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_title())
    }

    async fn titles_for_user(&self, user_id: i64) -> Result<Vec<Title>, AppError> {
        let rows = sqlx::query_as::<_, TitleRow>(
            r#"
            SELECT t.id, t.name, t.description, t.color, t.created_at
            FROM titles t
            JOIN user_titles ut ON ut.title_id = t.id
            WHERE ut.user_id = $1
            ORDER BY ut.granted_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_title()).collect())
    }

    async fn badges_for_user(&self, user_id: i64) -> Result<Vec<Badge>, AppError> {
        let rows = sqlx::query_as::<_, BadgeRow>(
            r#"
            SELECT b.id, b.name, b.description, b.icon_url, b.created_at
            FROM badges b
            JOIN user_badges ub ON ub.badge_id = b.id
            WHERE ub.user_id = $1
            ORDER BY ub.granted_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_badge()).collect())
    }

    async fn grant_title(&self, user_id: i64, title_id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_titles (user_id, title_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, title_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(title_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn grant_badge(&self, user_id: i64, badge_id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn user_owns_title(&self, user_id: i64, title_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM user_titles WHERE user_id = $1 AND title_id = $2)",
        )
        .bind(user_id)
        .bind(title_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn user_owns_badge(&self, user_id: i64, badge_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM user_badges WHERE user_id = $1 AND badge_id = $2)",
        )
        .bind(user_id)
        .bind(badge_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }
}
