//! Shop Service
//!
//! The DGT cosmetics shop: listing, purchases, and equipping owned titles.
//! A purchase debits the wallet and grants the title or badge in the same
//! request; granting is idempotent so a retried grant after a crash cannot
//! double-charge.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    Badge, CosmeticRepository, ShopItem, ShopItemKind, ShopItemRepository, Title, UserRepository,
    WalletRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Shop service errors
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("Item not found")]
    ItemNotFound,

    #[error("Item is not for sale")]
    ItemInactive,

    #[error("Already owned")]
    AlreadyOwned,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Title not owned")]
    TitleNotOwned,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for ShopError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::InsufficientBalance => ShopError::InsufficientBalance,
            e => ShopError::Internal(e.to_string()),
        }
    }
}

/// Shop service trait for dependency injection
#[async_trait]
pub trait ShopService: Send + Sync {
    /// Active catalog, cheapest first.
    async fn catalog(&self) -> Result<Vec<ShopItem>, ShopError>;

    /// Buy an item, debiting the wallet and granting the cosmetic.
    async fn purchase(&self, user_id: i64, item_id: i64) -> Result<ShopItem, ShopError>;

    /// Titles the user owns.
    async fn owned_titles(&self, user_id: i64) -> Result<Vec<Title>, ShopError>;

    /// Badges the user has earned.
    async fn owned_badges(&self, user_id: i64) -> Result<Vec<Badge>, ShopError>;

    /// Equip an owned title, or unequip with None.
    async fn equip_title(&self, user_id: i64, title_id: Option<i64>) -> Result<(), ShopError>;
}

/// ShopService implementation
pub struct ShopServiceImpl<I, C, W, U>
where
    I: ShopItemRepository,
    C: CosmeticRepository,
    W: WalletRepository,
    U: UserRepository,
{
    item_repo: Arc<I>,
    cosmetic_repo: Arc<C>,
    wallet_repo: Arc<W>,
    user_repo: Arc<U>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<I, C, W, U> ShopServiceImpl<I, C, W, U>
where
    I: ShopItemRepository,
    C: CosmeticRepository,
    W: WalletRepository,
    U: UserRepository,
{
    pub fn new(
        item_repo: Arc<I>,
        cosmetic_repo: Arc<C>,
        wallet_repo: Arc<W>,
        user_repo: Arc<U>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            item_repo,
            cosmetic_repo,
            wallet_repo,
            user_repo,
            id_generator,
        }
    }
}

#[async_trait]
impl<I, C, W, U> ShopService for ShopServiceImpl<I, C, W, U>
where
    I: ShopItemRepository + 'static,
    C: CosmeticRepository + 'static,
    W: WalletRepository + 'static,
    U: UserRepository + 'static,
{
    async fn catalog(&self) -> Result<Vec<ShopItem>, ShopError> {
        Ok(self.item_repo.find_active().await?)
    }

    async fn purchase(&self, user_id: i64, item_id: i64) -> Result<ShopItem, ShopError> {
        let item = self
            .item_repo
            .find_by_id(item_id)
            .await?
            .ok_or(ShopError::ItemNotFound)?;

        if !item.is_active {
            return Err(ShopError::ItemInactive);
        }

        // Cosmetics can only be owned once; check before debiting
        let already_owned = match item.kind {
            ShopItemKind::Title => {
                self.cosmetic_repo
                    .user_owns_title(user_id, item.grants_id)
                    .await?
            }
            ShopItemKind::Badge => {
                self.cosmetic_repo
                    .user_owns_badge(user_id, item.grants_id)
                    .await?
            }
        };
        if already_owned {
            return Err(ShopError::AlreadyOwned);
        }

        let note = format!("Shop purchase: {}", item.name);
        let tx_id = self.id_generator.generate();
        self.wallet_repo
            .purchase(user_id, item.price, tx_id, &note)
            .await?;

        match item.kind {
            ShopItemKind::Title => {
                self.cosmetic_repo
                    .grant_title(user_id, item.grants_id)
                    .await?
            }
            ShopItemKind::Badge => {
                self.cosmetic_repo
                    .grant_badge(user_id, item.grants_id)
                    .await?
            }
        }

        tracing::info!(
            user_id,
            item_id,
            price_units = item.price.units(),
            "Shop purchase completed"
        );

        Ok(item)
    }

    async fn owned_titles(&self, user_id: i64) -> Result<Vec<Title>, ShopError> {
        Ok(self.cosmetic_repo.titles_for_user(user_id).await?)
    }

    async fn owned_badges(&self, user_id: i64) -> Result<Vec<Badge>, ShopError> {
        Ok(self.cosmetic_repo.badges_for_user(user_id).await?)
    }

    async fn equip_title(&self, user_id: i64, title_id: Option<i64>) -> Result<(), ShopError> {
        if let Some(tid) = title_id {
            if !self.cosmetic_repo.user_owns_title(user_id, tid).await? {
                return Err(ShopError::TitleNotOwned);
            }
        }

        self.user_repo
            .set_equipped_title(user_id, title_id)
            .await?;

        Ok(())
    }
}
