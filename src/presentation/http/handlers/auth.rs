//! Authentication Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::application::dto::request::{LoginRequest, RefreshTokenRequest, RegisterRequest};
use crate::application::dto::response::{RegisterResponse, TokenResponse, UserResponse};
use crate::application::services::{AuthError, AuthService, AuthServiceImpl};
use crate::infrastructure::repositories::{PgSessionRepository, PgUserRepository};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn auth_service(state: &AppState) -> AuthServiceImpl<PgUserRepository, PgSessionRepository> {
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let session_repo = Arc::new(PgSessionRepository::new(state.db.clone()));
    AuthServiceImpl::new(
        user_repo,
        session_repo,
        state.snowflake.clone(),
        state.settings.jwt.clone(),
    )
}

fn map_auth_error(e: AuthError) -> AppError {
    match e {
        AuthError::EmailExists => AppError::Conflict("Email already exists".into()),
        AuthError::UsernameExists => AppError::Conflict("Username already exists".into()),
        AuthError::InvalidCredentials => AppError::Unauthorized("Invalid email or password".into()),
        AuthError::SessionNotFound | AuthError::InvalidToken => {
            AppError::Unauthorized("Invalid or expired refresh token".into())
        }
        AuthError::TokenExpired => AppError::Unauthorized("Refresh token expired".into()),
        e => AppError::Internal(e.to_string()),
    }
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let (user, tokens) = auth_service(&state)
        .register(&body.username, &body.email, &body.password)
        .await
        .map_err(map_auth_error)?;

    let response = RegisterResponse {
        user: UserResponse::from_user_private(user),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        token_type: tokens.token_type,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with credentials
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let tokens = auth_service(&state)
        .authenticate(&body.email, &body.password)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(TokenResponse::from(tokens)))
}

/// Refresh access token (rotates the refresh token)
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let tokens = auth_service(&state)
        .refresh_token(&body.refresh_token)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(TokenResponse::from(tokens)))
}

/// Logout (revoke refresh token)
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<StatusCode, AppError> {
    // Revoke errors are not surfaced; a stale token is already logged out
    let _ = auth_service(&state).revoke_token(&body.refresh_token).await;

    Ok(StatusCode::NO_CONTENT)
}
