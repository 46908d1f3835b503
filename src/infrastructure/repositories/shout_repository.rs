//! Shout Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Shout, ShoutKind, ShoutRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ShoutRow {
    id: i64,
    author_id: Option<i64>,
    kind: String,
    content: String,
    is_deleted: bool,
    created_at: DateTime<Utc>,
}

impl ShoutRow {
    fn into_shout(self) -> Shout {
        Shout {
            id: self.id,
            author_id: self.author_id,
            kind: ShoutKind::from_str(&self.kind),
            content: self.content,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
        }
    }
}

const SHOUT_COLUMNS: &str = "id, author_id, kind::TEXT AS kind, content, is_deleted, created_at";

/// PostgreSQL shout repository implementation.
#[derive(Clone)]
pub struct PgShoutRepository {
    pool: PgPool,
}

impl PgShoutRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShoutRepository for PgShoutRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Shout>, AppError> {
        let row = sqlx::query_as::<_, ShoutRow>(&format!(
            "SELECT {} FROM shouts WHERE id = $1",
            SHOUT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_shout()))
    }

    async fn create(&self, shout: &Shout) -> Result<Shout, AppError> {
        let row = sqlx::query_as::<_, ShoutRow>(&format!(
            r#"
            INSERT INTO shouts (id, author_id, kind, content)
            VALUES ($1, $2, $3::shout_kind, $4)
            RETURNING {}
            "#,
            SHOUT_COLUMNS
        ))
        .bind(shout.id)
        .bind(shout.author_id)
        .bind(shout.kind.as_str())
        .bind(&shout.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_shout())
    }

    async fn find_recent(&self, limit: i32) -> Result<Vec<Shout>, AppError> {
        let rows = sqlx::query_as::<_, ShoutRow>(&format!(
            r#"
            SELECT {} FROM shouts
            WHERE is_deleted = FALSE
            ORDER BY id DESC
            LIMIT $1
            "#,
            SHOUT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_shout()).collect())
    }

    async fn find_after(&self, after: i64, limit: i32) -> Result<Vec<Shout>, AppError> {
        let rows = sqlx::query_as::<_, ShoutRow>(&format!(
            r#"
            SELECT {} FROM shouts
            WHERE id > $1 AND is_deleted = FALSE
            ORDER BY id ASC
            LIMIT $2
            "#,
            SHOUT_COLUMNS
        ))
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_shout()).collect())
    }

    async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE shouts SET is_deleted = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Shout with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
