//! Wallet Handlers
//!
//! Balances, transaction history, tipping, and rain.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::shoutbox::{shoutbox_service, ShoutboxSvc};
use super::{load_user, parse_id};
use crate::application::dto::request::{HistoryQueryParams, RainRequest, TipRequest};
use crate::application::dto::response::{BalanceResponse, RainResponse, TransactionResponse};
use crate::application::services::{WalletError, WalletService, WalletServiceImpl};
use crate::domain::value_objects::DgtAmount;
use crate::infrastructure::repositories::{PgUserRepository, PgWalletRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

type WalletSvc = WalletServiceImpl<PgWalletRepository, PgUserRepository, ShoutboxSvc>;

fn wallet_service(state: &AppState) -> WalletSvc {
    let wallet_repo = Arc::new(PgWalletRepository::new(state.db.clone()));
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let shoutbox = Arc::new(shoutbox_service(state));
    WalletServiceImpl::new(
        wallet_repo,
        user_repo,
        shoutbox,
        state.snowflake.clone(),
        state.settings.rain.clone(),
    )
}

fn map_wallet_error(e: WalletError) -> AppError {
    match e {
        WalletError::InsufficientBalance => AppError::InsufficientBalance,
        WalletError::RecipientNotFound => AppError::NotFound("Recipient not found".into()),
        WalletError::SelfTip => AppError::BadRequest("Cannot tip yourself".into()),
        WalletError::BelowMinimum(msg) => AppError::BadRequest(msg),
        WalletError::NoRecipients => {
            AppError::BadRequest("Nobody is around to receive rain".into())
        }
        WalletError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Current DGT balance
pub async fn balance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<BalanceResponse>, AppError> {
    let balance = wallet_service(&state)
        .balance(auth.user_id)
        .await
        .map_err(map_wallet_error)?;

    Ok(Json(BalanceResponse {
        units: balance.units(),
        formatted: balance.to_string(),
    }))
}

/// Transaction history, newest first
pub async fn history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<HistoryQueryParams>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let before = params
        .before
        .as_deref()
        .map(|raw| parse_id(raw, "cursor"))
        .transpose()?;
    let limit = params.limit.unwrap_or(25).clamp(1, 100);

    let transactions = wallet_service(&state)
        .history(auth.user_id, limit, before)
        .await
        .map_err(map_wallet_error)?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

/// Tip another user
pub async fn tip(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<TipRequest>,
) -> Result<StatusCode, AppError> {
    body.validate().map_err(validation_error)?;

    let recipient_id = parse_id(&body.recipient_id, "recipient")?;
    let amount = DgtAmount::from_units(body.amount_units);

    let sender = load_user(&state, auth.user_id).await?;

    wallet_service(&state)
        .tip(&sender, recipient_id, amount, body.note.as_deref())
        .await
        .map_err(map_wallet_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Rain on everyone present in the shoutbox
pub async fn rain(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<RainRequest>,
) -> Result<Json<RainResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let amount = DgtAmount::from_units(body.amount_units);
    let sender = load_user(&state, auth.user_id).await?;

    let outcome = wallet_service(&state)
        .rain(&sender, amount)
        .await
        .map_err(map_wallet_error)?;

    Ok(Json(RainResponse {
        recipient_count: outcome.recipient_count,
        share_units: outcome.share.units(),
        distributed_units: outcome.distributed.units(),
        remainder_units: outcome.remainder.units(),
    }))
}
