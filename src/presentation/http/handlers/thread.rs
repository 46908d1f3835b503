//! Thread and Post Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use validator::Validate;

use super::{load_user, parse_id};
use crate::application::dto::request::{
    CreatePostRequest, CreateThreadRequest, PostQueryParams, ThreadQueryParams, UpdatePostRequest,
};
use crate::application::dto::response::{PostResponse, ThreadResponse};
use crate::application::services::{
    EconomyServiceImpl, ThreadError, ThreadService, ThreadServiceImpl, XpAward,
};
use crate::infrastructure::repositories::{
    PgForumNodeRepository, PgPostRepository, PgThreadRepository, PgUserRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

type ThreadSvc = ThreadServiceImpl<
    PgThreadRepository,
    PgPostRepository,
    PgForumNodeRepository,
    EconomyServiceImpl<PgUserRepository>,
>;

fn thread_service(state: &AppState) -> ThreadSvc {
    let thread_repo = Arc::new(PgThreadRepository::new(state.db.clone()));
    let post_repo = Arc::new(PgPostRepository::new(state.db.clone()));
    let forum_repo = Arc::new(PgForumNodeRepository::new(state.db.clone()));
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let economy = Arc::new(EconomyServiceImpl::new(
        user_repo,
        state.settings.economy.clone(),
    ));
    ThreadServiceImpl::new(
        thread_repo,
        post_repo,
        forum_repo,
        economy,
        state.snowflake.clone(),
    )
}

fn map_thread_error(e: ThreadError) -> AppError {
    match e {
        ThreadError::ThreadNotFound => AppError::NotFound("Thread not found".into()),
        ThreadError::ForumNotFound => AppError::NotFound("Forum not found".into()),
        ThreadError::PostNotFound => AppError::NotFound("Post not found".into()),
        ThreadError::NotAThreadTarget => {
            AppError::BadRequest("Threads cannot be created here".into())
        }
        ThreadError::ForumLocked => AppError::Conflict("Forum is locked".into()),
        ThreadError::ThreadLocked => AppError::Conflict("Thread is locked".into()),
        ThreadError::NotAuthor => AppError::Forbidden("Only the author may edit this post".into()),
        ThreadError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Thread creation response: the thread, its opening post, and the XP award
#[derive(Debug, Serialize)]
pub struct ThreadCreatedResponse {
    pub thread: ThreadResponse,
    pub post: PostResponse,
    pub xp: XpAward,
}

/// Post creation response with the XP award
#[derive(Debug, Serialize)]
pub struct PostCreatedResponse {
    pub post: PostResponse,
    pub xp: XpAward,
}

/// Create a thread in a forum
pub async fn create_thread(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(forum_id): Path<String>,
    Json(body): Json<CreateThreadRequest>,
) -> Result<(StatusCode, Json<ThreadCreatedResponse>), AppError> {
    body.validate().map_err(validation_error)?;
    let forum_id = parse_id(&forum_id, "forum")?;

    let author = load_user(&state, auth.user_id).await?;

    let (thread, post, xp) = thread_service(&state)
        .create_thread(&author, forum_id, &body.title, &body.content)
        .await
        .map_err(map_thread_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ThreadCreatedResponse {
            thread: thread.into(),
            post: post.into(),
            xp,
        }),
    ))
}

/// List threads in a forum, pinned first then newest activity
pub async fn list_threads(
    State(state): State<AppState>,
    Path(forum_id): Path<String>,
    Query(params): Query<ThreadQueryParams>,
) -> Result<Json<Vec<ThreadResponse>>, AppError> {
    let forum_id = parse_id(&forum_id, "forum")?;
    let before = params
        .before
        .as_deref()
        .map(|raw| parse_id(raw, "cursor"))
        .transpose()?;
    let limit = params.limit.unwrap_or(25).clamp(1, 100);

    let threads = thread_service(&state)
        .list_threads(forum_id, limit, before)
        .await
        .map_err(map_thread_error)?;

    Ok(Json(threads.into_iter().map(Into::into).collect()))
}

/// Get a single thread
pub async fn get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<ThreadResponse>, AppError> {
    let thread_id = parse_id(&thread_id, "thread")?;

    let thread = thread_service(&state)
        .get_thread(thread_id)
        .await
        .map_err(map_thread_error)?;

    Ok(Json(thread.into()))
}

/// Reply to a thread
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(thread_id): Path<String>,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostCreatedResponse>), AppError> {
    body.validate().map_err(validation_error)?;
    let thread_id = parse_id(&thread_id, "thread")?;

    let author = load_user(&state, auth.user_id).await?;

    let (post, xp) = thread_service(&state)
        .create_post(&author, thread_id, &body.content)
        .await
        .map_err(map_thread_error)?;

    Ok((
        StatusCode::CREATED,
        Json(PostCreatedResponse {
            post: post.into(),
            xp,
        }),
    ))
}

/// List posts in a thread, oldest first
pub async fn list_posts(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Query(params): Query<PostQueryParams>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let thread_id = parse_id(&thread_id, "thread")?;
    let after = params
        .after
        .as_deref()
        .map(|raw| parse_id(raw, "cursor"))
        .transpose()?;
    let limit = params.limit.unwrap_or(25).clamp(1, 100);

    let posts = thread_service(&state)
        .list_posts(thread_id, limit, after)
        .await
        .map_err(map_thread_error)?;

    Ok(Json(posts.into_iter().map(Into::into).collect()))
}

/// Edit a post (author only)
pub async fn edit_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    Json(body): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, AppError> {
    body.validate().map_err(validation_error)?;
    let post_id = parse_id(&post_id, "post")?;

    let post = thread_service(&state)
        .edit_post(auth.user_id, post_id, &body.content)
        .await
        .map_err(map_thread_error)?;

    Ok(Json(post.into()))
}
