//! Moderation and Admin Handlers
//!
//! Moderator content actions and admin back-office operations. Role
//! enforcement happens in the route guards; these handlers only run for
//! a token with the right role.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::parse_id;
use crate::application::dto::request::{
    AdjustBalanceRequest, GrantTitleRequest, HistoryQueryParams, ModReasonRequest, SetRoleRequest,
};
use crate::application::dto::response::{BalanceResponse, ModActionResponse, UserResponse};
use crate::application::services::{ModerationError, ModerationService, ModerationServiceImpl};
use crate::domain::value_objects::DgtAmount;
use crate::domain::{UserRepository, UserRole};
use crate::infrastructure::repositories::{
    PgCosmeticRepository, PgModActionRepository, PgPostRepository, PgShoutRepository,
    PgThreadRepository, PgUserRepository, PgWalletRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

type ModSvc = ModerationServiceImpl<
    PgModActionRepository,
    PgPostRepository,
    PgThreadRepository,
    PgShoutRepository,
    PgUserRepository,
    PgWalletRepository,
    PgCosmeticRepository,
>;

fn moderation_service(state: &AppState) -> ModSvc {
    let action_repo = Arc::new(PgModActionRepository::new(state.db.clone()));
    let post_repo = Arc::new(PgPostRepository::new(state.db.clone()));
    let thread_repo = Arc::new(PgThreadRepository::new(state.db.clone()));
    let shout_repo = Arc::new(PgShoutRepository::new(state.db.clone()));
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let wallet_repo = Arc::new(PgWalletRepository::new(state.db.clone()));
    let cosmetic_repo = Arc::new(PgCosmeticRepository::new(state.db.clone()));
    ModerationServiceImpl::new(
        action_repo,
        post_repo,
        thread_repo,
        shout_repo,
        user_repo,
        wallet_repo,
        cosmetic_repo,
        state.snowflake.clone(),
    )
}

fn map_moderation_error(e: ModerationError) -> AppError {
    match e {
        ModerationError::TargetNotFound => AppError::NotFound("Target not found".into()),
        ModerationError::InsufficientBalance => AppError::InsufficientBalance,
        ModerationError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Pull the optional reason out of an optional body.
fn extract_reason(body: &Option<Json<ModReasonRequest>>) -> Result<Option<&str>, AppError> {
    if let Some(Json(req)) = body {
        req.validate().map_err(validation_error)?;
        Ok(req.reason.as_deref())
    } else {
        Ok(None)
    }
}

/// Soft-delete a post (moderator)
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    body: Option<Json<ModReasonRequest>>,
) -> Result<StatusCode, AppError> {
    let post_id = parse_id(&post_id, "post")?;
    let reason = extract_reason(&body)?;

    moderation_service(&state)
        .delete_post(auth.user_id, post_id, reason)
        .await
        .map_err(map_moderation_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lock a thread (moderator)
pub async fn lock_thread(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(thread_id): Path<String>,
    body: Option<Json<ModReasonRequest>>,
) -> Result<StatusCode, AppError> {
    set_thread_locked(state, auth, thread_id, body, true).await
}

/// Unlock a thread (moderator)
pub async fn unlock_thread(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(thread_id): Path<String>,
    body: Option<Json<ModReasonRequest>>,
) -> Result<StatusCode, AppError> {
    set_thread_locked(state, auth, thread_id, body, false).await
}

async fn set_thread_locked(
    state: AppState,
    auth: AuthUser,
    thread_id: String,
    body: Option<Json<ModReasonRequest>>,
    locked: bool,
) -> Result<StatusCode, AppError> {
    let thread_id = parse_id(&thread_id, "thread")?;
    let reason = extract_reason(&body)?;

    moderation_service(&state)
        .set_thread_locked(auth.user_id, thread_id, locked, reason)
        .await
        .map_err(map_moderation_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Pin a thread (moderator)
pub async fn pin_thread(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(thread_id): Path<String>,
    body: Option<Json<ModReasonRequest>>,
) -> Result<StatusCode, AppError> {
    set_thread_pinned(state, auth, thread_id, body, true).await
}

/// Unpin a thread (moderator)
pub async fn unpin_thread(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(thread_id): Path<String>,
    body: Option<Json<ModReasonRequest>>,
) -> Result<StatusCode, AppError> {
    set_thread_pinned(state, auth, thread_id, body, false).await
}

async fn set_thread_pinned(
    state: AppState,
    auth: AuthUser,
    thread_id: String,
    body: Option<Json<ModReasonRequest>>,
    pinned: bool,
) -> Result<StatusCode, AppError> {
    let thread_id = parse_id(&thread_id, "thread")?;
    let reason = extract_reason(&body)?;

    moderation_service(&state)
        .set_thread_pinned(auth.user_id, thread_id, pinned, reason)
        .await
        .map_err(map_moderation_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Soft-delete a shout (moderator)
pub async fn delete_shout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(shout_id): Path<String>,
    body: Option<Json<ModReasonRequest>>,
) -> Result<StatusCode, AppError> {
    let shout_id = parse_id(&shout_id, "shout")?;
    let reason = extract_reason(&body)?;

    moderation_service(&state)
        .delete_shout(auth.user_id, shout_id, reason)
        .await
        .map_err(map_moderation_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Adjust a user's DGT balance (admin)
pub async fn adjust_balance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(body): Json<AdjustBalanceRequest>,
) -> Result<Json<BalanceResponse>, AppError> {
    body.validate().map_err(validation_error)?;
    let user_id = parse_id(&user_id, "user")?;

    let new_balance = moderation_service(&state)
        .adjust_balance(
            auth.user_id,
            user_id,
            DgtAmount::from_units(body.delta_units),
            &body.reason,
        )
        .await
        .map_err(map_moderation_error)?;

    Ok(Json(BalanceResponse {
        units: new_balance.units(),
        formatted: new_balance.to_string(),
    }))
}

/// Change a user's role (admin)
pub async fn set_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(body): Json<SetRoleRequest>,
) -> Result<StatusCode, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    let role = UserRole::from_str(&body.role);

    moderation_service(&state)
        .set_role(auth.user_id, user_id, role)
        .await
        .map_err(map_moderation_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Grant a title outside the shop (admin)
pub async fn grant_title(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<GrantTitleRequest>,
) -> Result<StatusCode, AppError> {
    let user_id = parse_id(&body.user_id, "user")?;
    let title_id = parse_id(&body.title_id, "title")?;

    moderation_service(&state)
        .grant_title(auth.user_id, user_id, title_id)
        .await
        .map_err(map_moderation_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, serde::Deserialize)]
pub struct ListUsersQueryParams {
    pub limit: Option<i32>,
    pub offset: Option<i64>,
}

/// List user accounts (admin back office)
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersQueryParams>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let offset = params.offset.unwrap_or(0).max(0);

    let users = PgUserRepository::new(state.db.clone())
        .list(limit, offset)
        .await?;

    Ok(Json(
        users
            .into_iter()
            .map(UserResponse::from_user_private)
            .collect(),
    ))
}

/// Recent moderation audit log entries (moderator activity feed,
/// also mounted under the admin audit-log path)
pub async fn audit_log(
    State(state): State<AppState>,
    Query(params): Query<HistoryQueryParams>,
) -> Result<Json<Vec<ModActionResponse>>, AppError> {
    let before = params
        .before
        .as_deref()
        .map(|raw| parse_id(raw, "cursor"))
        .transpose()?;
    let limit = params.limit.unwrap_or(50).clamp(1, 200);

    let actions = moderation_service(&state)
        .audit_log(limit, before)
        .await
        .map_err(map_moderation_error)?;

    Ok(Json(actions.into_iter().map(Into::into).collect()))
}
