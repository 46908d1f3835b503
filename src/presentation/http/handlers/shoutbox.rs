//! Shoutbox Handlers
//!
//! The poll-based chat feed. Reads carry optional auth so presence is
//! refreshed for logged-in pollers; posting requires auth.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use validator::Validate;

use super::{load_user, parse_id};
use crate::application::dto::request::{CreateShoutRequest, ShoutQueryParams};
use crate::application::dto::response::{OnlineResponse, ShoutResponse};
use crate::application::services::{
    EconomyServiceImpl, ShoutboxError, ShoutboxService, ShoutboxServiceImpl, XpAward,
};
use crate::infrastructure::cache::PresenceCacheService;
use crate::infrastructure::repositories::{PgShoutRepository, PgUserRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

pub(crate) type ShoutboxSvc =
    ShoutboxServiceImpl<PgShoutRepository, EconomyServiceImpl<PgUserRepository>>;

pub(crate) fn shoutbox_service(state: &AppState) -> ShoutboxSvc {
    let shout_repo = Arc::new(PgShoutRepository::new(state.db.clone()));
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let economy = Arc::new(EconomyServiceImpl::new(
        user_repo,
        state.settings.economy.clone(),
    ));
    let presence = PresenceCacheService::new(
        state.redis.clone(),
        state.settings.rain.presence_ttl_secs,
    );
    ShoutboxServiceImpl::new(shout_repo, economy, presence, state.snowflake.clone())
}

fn map_shoutbox_error(e: ShoutboxError) -> AppError {
    match e {
        ShoutboxError::NotFound => AppError::NotFound("Shout not found".into()),
        ShoutboxError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Shout creation response with the XP award
#[derive(Debug, Serialize)]
pub struct ShoutCreatedResponse {
    pub shout: ShoutResponse,
    pub xp: XpAward,
}

/// Get shoutbox messages.
///
/// Without a cursor this returns the most recent shouts, newest first
/// (initial page load). With `after` it returns shouts past the cursor,
/// oldest first, and refreshes the caller's presence (polling).
pub async fn get_messages(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    Query(params): Query<ShoutQueryParams>,
) -> Result<Json<Vec<ShoutResponse>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(state.settings.shoutbox.default_page_size)
        .clamp(1, 100);

    let service = shoutbox_service(&state);

    let shouts = match params.after.as_deref() {
        Some(raw) => {
            let after = parse_id(raw, "cursor")?;
            let caller_id = auth.map(|Extension(a)| a.user_id);
            service
                .poll(caller_id, after, limit)
                .await
                .map_err(map_shoutbox_error)?
        }
        None => service.recent(limit).await.map_err(map_shoutbox_error)?,
    };

    Ok(Json(shouts.into_iter().map(Into::into).collect()))
}

/// Post a shout
pub async fn post_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateShoutRequest>,
) -> Result<(StatusCode, Json<ShoutCreatedResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    if body.content.chars().count() > state.settings.shoutbox.max_content_length {
        return Err(AppError::Validation("Shout is too long".into()));
    }

    let author = load_user(&state, auth.user_id).await?;

    let (shout, xp) = shoutbox_service(&state)
        .shout(&author, &body.content)
        .await
        .map_err(map_shoutbox_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ShoutCreatedResponse {
            shout: shout.into(),
            xp,
        }),
    ))
}

/// Users currently present in the shoutbox
pub async fn online(State(state): State<AppState>) -> Result<Json<OnlineResponse>, AppError> {
    let user_ids = shoutbox_service(&state)
        .online()
        .await
        .map_err(map_shoutbox_error)?;

    Ok(Json(OnlineResponse {
        count: user_ids.len(),
        user_ids: user_ids.into_iter().map(|id| id.to_string()).collect(),
    }))
}
