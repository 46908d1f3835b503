//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints. Handlers stay thin: parse and
//! validate the request, assemble the service from [`AppState`], map the
//! service error to an [`AppError`], and shape the response DTO.

pub mod auth;
pub mod forum;
pub mod health;
pub mod moderation;
pub mod shop;
pub mod shoutbox;
pub mod thread;
pub mod user;
pub mod wallet;

use crate::domain::{User, UserRepository};
use crate::infrastructure::repositories::PgUserRepository;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Parse a snowflake id from its string form in paths and bodies.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {} id", what)))
}

/// Load the authenticated user's row. Services that award XP or move DGT
/// take the full entity, not just the id from the token.
pub(crate) async fn load_user(state: &AppState, user_id: i64) -> Result<User, AppError> {
    PgUserRepository::new(state.db.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))
}
