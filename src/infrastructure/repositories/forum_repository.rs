//! Forum Node Repository Implementation
//!
//! PostgreSQL implementation of the ForumNodeRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ForumNode, ForumNodeRepository, NodeKind};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ForumNodeRow {
    id: i64,
    parent_id: Option<i64>,
    kind: String,
    name: String,
    slug: String,
    description: Option<String>,
    position: i32,
    xp_multiplier: f64,
    is_locked: bool,
    thread_count: i64,
    post_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ForumNodeRow {
    fn into_node(self) -> ForumNode {
        ForumNode {
            id: self.id,
            parent_id: self.parent_id,
            kind: NodeKind::from_str(&self.kind),
            name: self.name,
            slug: self.slug,
            description: self.description,
            position: self.position,
            xp_multiplier: self.xp_multiplier,
            is_locked: self.is_locked,
            thread_count: self.thread_count,
            post_count: self.post_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const NODE_COLUMNS: &str = "id, parent_id, kind::TEXT AS kind, name, slug, description, position, \
                            xp_multiplier, is_locked, thread_count, post_count, created_at, \
                            updated_at";

/// PostgreSQL forum node repository implementation.
#[derive(Clone)]
pub struct PgForumNodeRepository {
    pool: PgPool,
}

impl PgForumNodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ForumNodeRepository for PgForumNodeRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ForumNode>, AppError> {
        let row = sqlx::query_as::<_, ForumNodeRow>(&format!(
            "SELECT {} FROM forum_nodes WHERE id = $1",
            NODE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_node()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ForumNode>, AppError> {
        let row = sqlx::query_as::<_, ForumNodeRow>(&format!(
            "SELECT {} FROM forum_nodes WHERE slug = $1",
            NODE_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_node()))
    }

    async fn find_all(&self) -> Result<Vec<ForumNode>, AppError> {
        let rows = sqlx::query_as::<_, ForumNodeRow>(&format!(
            "SELECT {} FROM forum_nodes",
            NODE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_node()).collect())
    }

    async fn create(&self, node: &ForumNode) -> Result<ForumNode, AppError> {
        let row = sqlx::query_as::<_, ForumNodeRow>(&format!(
            r#"
            INSERT INTO forum_nodes
                (id, parent_id, kind, name, slug, description, position, xp_multiplier, is_locked)
            VALUES ($1, $2, $3::forum_node_kind, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            NODE_COLUMNS
        ))
        .bind(node.id)
        .bind(node.parent_id)
        .bind(node.kind.as_str())
        .bind(&node.name)
        .bind(&node.slug)
        .bind(&node.description)
        .bind(node.position)
        .bind(node.xp_multiplier)
        .bind(node.is_locked)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("Forum node with slug '{}' already exists", node.slug))
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_node())
    }

    async fn update(&self, node: &ForumNode) -> Result<ForumNode, AppError> {
        let row = sqlx::query_as::<_, ForumNodeRow>(&format!(
            r#"
            UPDATE forum_nodes
            SET name = $2,
                description = $3,
                position = $4,
                xp_multiplier = $5,
                is_locked = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            NODE_COLUMNS
        ))
        .bind(node.id)
        .bind(&node.name)
        .bind(&node.description)
        .bind(node.position)
        .bind(node.xp_multiplier)
        .bind(node.is_locked)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Forum node with id {} not found", node.id)))?;

        Ok(row.into_node())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let has_children = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM forum_nodes WHERE parent_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if has_children {
            return Err(AppError::Conflict(
                "Cannot delete a forum node that still has children".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM forum_nodes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Forum node with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM forum_nodes WHERE slug = $1)",
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn increment_counts(
        &self,
        id: i64,
        thread_delta: i64,
        post_delta: i64,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE forum_nodes
            SET thread_count = thread_count + $2,
                post_count = post_count + $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(thread_delta)
        .bind(post_delta)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Forum node with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
