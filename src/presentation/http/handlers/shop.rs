//! Shop and Cosmetics Handlers
//!
//! The DGT shop catalog and purchases, plus the owned-cosmetics routes
//! under `/users/@me` and the admin item management.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use validator::Validate;

use super::parse_id;
use crate::application::dto::request::{
    CreateShopItemRequest, EquipTitleRequest, PurchaseRequest,
};
use crate::application::dto::response::{BadgeResponse, ShopItemResponse, TitleResponse};
use crate::application::services::{ShopError, ShopService, ShopServiceImpl};
use crate::domain::value_objects::DgtAmount;
use crate::domain::{ShopItem, ShopItemKind, ShopItemRepository};
use crate::infrastructure::repositories::{
    PgCosmeticRepository, PgShopItemRepository, PgUserRepository, PgWalletRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

type ShopSvc = ShopServiceImpl<
    PgShopItemRepository,
    PgCosmeticRepository,
    PgWalletRepository,
    PgUserRepository,
>;

fn shop_service(state: &AppState) -> ShopSvc {
    let item_repo = Arc::new(PgShopItemRepository::new(state.db.clone()));
    let cosmetic_repo = Arc::new(PgCosmeticRepository::new(state.db.clone()));
    let wallet_repo = Arc::new(PgWalletRepository::new(state.db.clone()));
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    ShopServiceImpl::new(
        item_repo,
        cosmetic_repo,
        wallet_repo,
        user_repo,
        state.snowflake.clone(),
    )
}

fn map_shop_error(e: ShopError) -> AppError {
    match e {
        ShopError::ItemNotFound => AppError::NotFound("Item not found".into()),
        ShopError::ItemInactive => AppError::BadRequest("Item is not for sale".into()),
        ShopError::AlreadyOwned => AppError::Conflict("Already owned".into()),
        ShopError::InsufficientBalance => AppError::InsufficientBalance,
        ShopError::TitleNotOwned => AppError::BadRequest("Title not owned".into()),
        ShopError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Active shop catalog, cheapest first
pub async fn catalog(
    State(state): State<AppState>,
) -> Result<Json<Vec<ShopItemResponse>>, AppError> {
    let items = shop_service(&state)
        .catalog()
        .await
        .map_err(map_shop_error)?;

    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// Buy an item
pub async fn purchase(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<PurchaseRequest>,
) -> Result<Json<ShopItemResponse>, AppError> {
    let item_id = parse_id(&body.item_id, "item")?;

    let item = shop_service(&state)
        .purchase(auth.user_id, item_id)
        .await
        .map_err(map_shop_error)?;

    Ok(Json(item.into()))
}

/// Titles the current user owns
pub async fn owned_titles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<TitleResponse>>, AppError> {
    let titles = shop_service(&state)
        .owned_titles(auth.user_id)
        .await
        .map_err(map_shop_error)?;

    Ok(Json(titles.into_iter().map(Into::into).collect()))
}

/// Badges the current user has earned
pub async fn owned_badges(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<BadgeResponse>>, AppError> {
    let badges = shop_service(&state)
        .owned_badges(auth.user_id)
        .await
        .map_err(map_shop_error)?;

    Ok(Json(badges.into_iter().map(Into::into).collect()))
}

/// Equip an owned title, or unequip by sending a null title_id
pub async fn equip_title(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<EquipTitleRequest>,
) -> Result<StatusCode, AppError> {
    let title_id = body
        .title_id
        .as_deref()
        .map(|raw| parse_id(raw, "title"))
        .transpose()?;

    shop_service(&state)
        .equip_title(auth.user_id, title_id)
        .await
        .map_err(map_shop_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Create a shop item (admin)
pub async fn create_item(
    State(state): State<AppState>,
    Json(body): Json<CreateShopItemRequest>,
) -> Result<(StatusCode, Json<ShopItemResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let item = ShopItem {
        id: state.snowflake.generate(),
        kind: ShopItemKind::from_str(&body.kind),
        name: body.name,
        description: body.description,
        price: DgtAmount::from_units(body.price_units),
        grants_id: parse_id(&body.grants_id, "cosmetic")?,
        is_active: true,
        created_at: Utc::now(),
    };

    let created = PgShopItemRepository::new(state.db.clone())
        .create(&item)
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[derive(Debug, serde::Deserialize)]
pub struct SetItemActiveRequest {
    pub is_active: bool,
}

/// Activate or retire a shop item (admin)
pub async fn set_item_active(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(body): Json<SetItemActiveRequest>,
) -> Result<StatusCode, AppError> {
    let item_id = parse_id(&item_id, "item")?;

    PgShopItemRepository::new(state.db.clone())
        .set_active(item_id, body.is_active)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
