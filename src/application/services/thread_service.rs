//! Thread Service
//!
//! Thread and post creation plus the XP awards they trigger. Counter
//! bookkeeping on the forum node and thread rows happens here so handlers
//! stay thin.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::economy_service::{EconomyService, XpAction, XpAward};
use crate::domain::{ForumNodeRepository, Post, PostRepository, Thread, ThreadRepository, User};
use crate::shared::snowflake::SnowflakeGenerator;

/// Thread service errors
#[derive(Debug, thiserror::Error)]
pub enum ThreadError {
    #[error("Thread not found")]
    ThreadNotFound,

    #[error("Forum not found")]
    ForumNotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("Threads cannot be created here")]
    NotAThreadTarget,

    #[error("Forum is locked")]
    ForumLocked,

    #[error("Thread is locked")]
    ThreadLocked,

    #[error("Only the author may edit this post")]
    NotAuthor,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Thread service trait for dependency injection
#[async_trait]
pub trait ThreadService: Send + Sync {
    /// Create a thread with its opening post and award XP.
    async fn create_thread(
        &self,
        author: &User,
        forum_id: i64,
        title: &str,
        content: &str,
    ) -> Result<(Thread, Post, XpAward), ThreadError>;

    /// List threads in a forum, pinned first.
    async fn list_threads(
        &self,
        forum_id: i64,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<Thread>, ThreadError>;

    /// Look up a single thread.
    async fn get_thread(&self, id: i64) -> Result<Thread, ThreadError>;

    /// Reply to a thread and award XP.
    async fn create_post(
        &self,
        author: &User,
        thread_id: i64,
        content: &str,
    ) -> Result<(Post, XpAward), ThreadError>;

    /// List posts in a thread, oldest first.
    async fn list_posts(
        &self,
        thread_id: i64,
        limit: i32,
        after: Option<i64>,
    ) -> Result<Vec<Post>, ThreadError>;

    /// Edit a post. Only the author may edit; no XP is re-awarded.
    async fn edit_post(
        &self,
        author_id: i64,
        post_id: i64,
        content: &str,
    ) -> Result<Post, ThreadError>;
}

/// ThreadService implementation
pub struct ThreadServiceImpl<T, P, F, E>
where
    T: ThreadRepository,
    P: PostRepository,
    F: ForumNodeRepository,
    E: EconomyService,
{
    thread_repo: Arc<T>,
    post_repo: Arc<P>,
    forum_repo: Arc<F>,
    economy: Arc<E>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<T, P, F, E> ThreadServiceImpl<T, P, F, E>
where
    T: ThreadRepository,
    P: PostRepository,
    F: ForumNodeRepository,
    E: EconomyService,
{
    pub fn new(
        thread_repo: Arc<T>,
        post_repo: Arc<P>,
        forum_repo: Arc<F>,
        economy: Arc<E>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            thread_repo,
            post_repo,
            forum_repo,
            economy,
            id_generator,
        }
    }
}

#[async_trait]
impl<T, P, F, E> ThreadService for ThreadServiceImpl<T, P, F, E>
where
    T: ThreadRepository + 'static,
    P: PostRepository + 'static,
    F: ForumNodeRepository + 'static,
    E: EconomyService + 'static,
{
    async fn create_thread(
        &self,
        author: &User,
        forum_id: i64,
        title: &str,
        content: &str,
    ) -> Result<(Thread, Post, XpAward), ThreadError> {
        let forum = self
            .forum_repo
            .find_by_id(forum_id)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?
            .ok_or(ThreadError::ForumNotFound)?;

        if !forum.kind.accepts_threads() {
            return Err(ThreadError::NotAThreadTarget);
        }
        if forum.is_locked {
            return Err(ThreadError::ForumLocked);
        }

        let now = Utc::now();
        let thread = Thread {
            id: self.id_generator.generate(),
            forum_id,
            author_id: author.id,
            title: title.to_string(),
            is_pinned: false,
            is_locked: false,
            post_count: 0,
            last_post_at: None,
            created_at: now,
            updated_at: now,
        };
        let created_thread = self
            .thread_repo
            .create(&thread)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?;

        let post = Post {
            id: self.id_generator.generate(),
            thread_id: created_thread.id,
            author_id: author.id,
            content: content.to_string(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        let created_post = self
            .post_repo
            .create(&post)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?;

        self.thread_repo
            .record_post(created_thread.id, now)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?;
        self.forum_repo
            .increment_counts(forum_id, 1, 1)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?;

        let award = self
            .economy
            .award_xp(author, XpAction::CreateThread, Some(&forum))
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?;

        Ok((created_thread, created_post, award))
    }

    async fn list_threads(
        &self,
        forum_id: i64,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<Thread>, ThreadError> {
        self.thread_repo
            .find_by_forum(forum_id, limit, before)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))
    }

    async fn get_thread(&self, id: i64) -> Result<Thread, ThreadError> {
        self.thread_repo
            .find_by_id(id)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?
            .ok_or(ThreadError::ThreadNotFound)
    }

    async fn create_post(
        &self,
        author: &User,
        thread_id: i64,
        content: &str,
    ) -> Result<(Post, XpAward), ThreadError> {
        let thread = self.get_thread(thread_id).await?;

        if !thread.accepts_posts() {
            return Err(ThreadError::ThreadLocked);
        }

        let forum = self
            .forum_repo
            .find_by_id(thread.forum_id)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?
            .ok_or(ThreadError::ForumNotFound)?;

        let now = Utc::now();
        let post = Post {
            id: self.id_generator.generate(),
            thread_id,
            author_id: author.id,
            content: content.to_string(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        let created_post = self
            .post_repo
            .create(&post)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?;

        self.thread_repo
            .record_post(thread_id, now)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?;
        self.forum_repo
            .increment_counts(thread.forum_id, 0, 1)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?;

        let award = self
            .economy
            .award_xp(author, XpAction::CreatePost, Some(&forum))
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?;

        Ok((created_post, award))
    }

    async fn list_posts(
        &self,
        thread_id: i64,
        limit: i32,
        after: Option<i64>,
    ) -> Result<Vec<Post>, ThreadError> {
        self.post_repo
            .find_by_thread(thread_id, limit, after)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))
    }

    async fn edit_post(
        &self,
        author_id: i64,
        post_id: i64,
        content: &str,
    ) -> Result<Post, ThreadError> {
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))?
            .ok_or(ThreadError::PostNotFound)?;

        if post.author_id != author_id {
            return Err(ThreadError::NotAuthor);
        }

        self.post_repo
            .update_content(post_id, content)
            .await
            .map_err(|e| ThreadError::Internal(e.to_string()))
    }
}
