//! Thread Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Thread, ThreadRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ThreadRow {
    id: i64,
    forum_id: i64,
    author_id: i64,
    title: String,
    is_pinned: bool,
    is_locked: bool,
    post_count: i64,
    last_post_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ThreadRow {
    fn into_thread(self) -> Thread {
        Thread {
            id: self.id,
            forum_id: self.forum_id,
            author_id: self.author_id,
            title: self.title,
            is_pinned: self.is_pinned,
            is_locked: self.is_locked,
            post_count: self.post_count,
            last_post_at: self.last_post_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const THREAD_COLUMNS: &str = "id, forum_id, author_id, title, is_pinned, is_locked, post_count, \
                              last_post_at, created_at, updated_at";

/// PostgreSQL thread repository implementation.
#[derive(Clone)]
pub struct PgThreadRepository {
    pool: PgPool,
}

impl PgThreadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThreadRepository for PgThreadRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Thread>, AppError> {
        let row = sqlx::query_as::<_, ThreadRow>(&format!(
            "SELECT {} FROM threads WHERE id = $1",
            THREAD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_thread()))
    }

    async fn create(&self, thread: &Thread) -> Result<Thread, AppError> {
        let row = sqlx::query_as::<_, ThreadRow>(&format!(
            r#"
            INSERT INTO threads (id, forum_id, author_id, title)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            THREAD_COLUMNS
        ))
        .bind(thread.id)
        .bind(thread.forum_id)
        .bind(thread.author_id)
        .bind(&thread.title)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_thread())
    }

    async fn find_by_forum(
        &self,
        forum_id: i64,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<Thread>, AppError> {
        let rows = match before {
            Some(before_id) => {
                sqlx::query_as::<_, ThreadRow>(&format!(
                    r#"
                    SELECT {} FROM threads
                    WHERE forum_id = $1 AND id < $2
                    ORDER BY is_pinned DESC, last_post_at DESC NULLS LAST, id DESC
                    LIMIT $3
                    "#,
                    THREAD_COLUMNS
                ))
                .bind(forum_id)
                .bind(before_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ThreadRow>(&format!(
                    r#"
                    SELECT {} FROM threads
                    WHERE forum_id = $1
                    ORDER BY is_pinned DESC, last_post_at DESC NULLS LAST, id DESC
                    LIMIT $2
                    "#,
                    THREAD_COLUMNS
                ))
                .bind(forum_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(|r| r.into_thread()).collect())
    }

    async fn set_pinned(&self, id: i64, pinned: bool) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE threads SET is_pinned = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(pinned)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Thread with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn set_locked(&self, id: i64, locked: bool) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE threads SET is_locked = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(locked)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Thread with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn record_post(&self, id: i64, at: DateTime<Utc>) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE threads
            SET post_count = post_count + 1,
                last_post_at = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Thread with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
