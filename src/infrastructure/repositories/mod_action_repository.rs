//! Moderation Action Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ModAction, ModActionKind, ModActionRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ModActionRow {
    id: i64,
    actor_id: i64,
    kind: String,
    target_user_id: Option<i64>,
    target_id: Option<i64>,
    reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl ModActionRow {
    fn into_action(self) -> Result<ModAction, AppError> {
        let kind = ModActionKind::from_str(&self.kind)
            .ok_or_else(|| AppError::Internal(format!("Unknown mod action kind '{}'", self.kind)))?;
        Ok(ModAction {
            id: self.id,
            actor_id: self.actor_id,
            kind,
            target_user_id: self.target_user_id,
            target_id: self.target_id,
            reason: self.reason,
            created_at: self.created_at,
        })
    }
}

const ACTION_COLUMNS: &str =
    "id, actor_id, kind::TEXT AS kind, target_user_id, target_id, reason, created_at";

/// PostgreSQL moderation audit log repository.
#[derive(Clone)]
pub struct PgModActionRepository {
    pool: PgPool,
}

impl PgModActionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModActionRepository for PgModActionRepository {
    async fn create(&self, action: &ModAction) -> Result<ModAction, AppError> {
        let row = sqlx::query_as::<_, ModActionRow>(&format!(
            r#"
            INSERT INTO mod_actions (id, actor_id, kind, target_user_id, target_id, reason)
            VALUES ($1, $2, $3::mod_action_kind, $4, $5, $6)
            RETURNING {}
            "#,
            ACTION_COLUMNS
        ))
        .bind(action.id)
        .bind(action.actor_id)
        .bind(action.kind.as_str())
        .bind(action.target_user_id)
        .bind(action.target_id)
        .bind(&action.reason)
        .fetch_one(&self.pool)
        .await?;

        row.into_action()
    }

    async fn find_recent(
        &self,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<ModAction>, AppError> {
        let rows = sqlx::query_as::<_, ModActionRow>(&format!(
            r#"
            SELECT {} FROM mod_actions
            WHERE id < $1
            ORDER BY id DESC
            LIMIT $2
            "#,
            ACTION_COLUMNS
        ))
        .bind(before.unwrap_or(i64::MAX))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_action()).collect()
    }
}
