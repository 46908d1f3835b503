//! Post entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A reply inside a thread.
///
/// Maps to the `posts` table. Deletion is soft: the row stays for thread
/// pagination but content is blanked and `is_deleted` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub thread_id: i64,
    pub author_id: i64,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for post data access.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError>;

    async fn create(&self, post: &Post) -> Result<Post, AppError>;

    /// Posts in a thread, oldest first, keyset-paginated by id.
    async fn find_by_thread(
        &self,
        thread_id: i64,
        limit: i32,
        after: Option<i64>,
    ) -> Result<Vec<Post>, AppError>;

    /// Edit a post's content. Only the author may edit.
    async fn update_content(&self, id: i64, content: &str) -> Result<Post, AppError>;

    /// Soft-delete a post, blanking its content.
    async fn soft_delete(&self, id: i64) -> Result<(), AppError>;
}
