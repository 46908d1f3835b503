//! User Handlers

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use validator::Validate;

use super::{load_user, parse_id};
use crate::application::dto::request::UpdateProfileRequest;
use crate::application::dto::response::{LeaderboardEntryResponse, UserResponse};
use crate::domain::UserRepository;
use crate::infrastructure::cache::{keys, Cache, RedisCache};
use crate::infrastructure::repositories::PgUserRepository;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

const LEADERBOARD_CACHE_TTL_SECS: u64 = 30;

/// Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = load_user(&state, auth.user_id).await?;
    Ok(Json(UserResponse::from_user_private(user)))
}

/// Update current user profile
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let mut user = load_user(&state, auth.user_id).await?;
    if let Some(avatar_url) = body.avatar_url {
        user.avatar_url = Some(avatar_url);
    }
    if let Some(bio) = body.bio {
        user.bio = Some(bio);
    }

    let updated = PgUserRepository::new(state.db.clone())
        .update_profile(&user)
        .await?;

    Ok(Json(UserResponse::from_user_private(updated)))
}

/// Get user by ID (public profile, no email or balance)
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = parse_id(&user_id, "user")?;

    let user = PgUserRepository::new(state.db.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse::from_user(user)))
}

#[derive(Debug, serde::Deserialize)]
pub struct LeaderboardQueryParams {
    pub limit: Option<i32>,
}

/// XP leaderboard, highest total first
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardQueryParams>,
) -> Result<Json<Vec<LeaderboardEntryResponse>>, AppError> {
    let limit = params.limit.unwrap_or(25).clamp(1, 100);

    // Short-lived cache; staleness only delays rank changes by seconds
    let cache = RedisCache::with_prefix(state.redis.clone(), "degentalk:");
    let cache_key = keys::leaderboard(limit);
    match cache
        .get::<Vec<LeaderboardEntryResponse>>(&cache_key)
        .await
    {
        Ok(Some(entries)) => return Ok(Json(entries)),
        Ok(None) => {}
        Err(e) => tracing::warn!("Leaderboard cache read failed: {}", e),
    }

    let users = PgUserRepository::new(state.db.clone())
        .top_by_xp(limit)
        .await?;

    let entries: Vec<LeaderboardEntryResponse> = users
        .into_iter()
        .enumerate()
        .map(|(i, user)| LeaderboardEntryResponse {
            rank: i + 1,
            user_id: user.id.to_string(),
            username: user.username,
            xp: user.xp,
            level: user.level,
        })
        .collect();

    if let Err(e) = cache
        .set_ex(&cache_key, &entries, LEADERBOARD_CACHE_TTL_SECS)
        .await
    {
        tracing::warn!("Leaderboard cache write failed: {}", e);
    }

    Ok(Json(entries))
}
