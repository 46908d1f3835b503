//! Shop item entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::DgtAmount;
use crate::shared::error::AppError;

/// What a shop item grants on purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopItemKind {
    Title,
    Badge,
}

impl ShopItemKind {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "badge" => Self::Badge,
            _ => Self::Title,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Badge => "badge",
        }
    }
}

/// A purchasable item in the DGT shop.
///
/// `grants_id` points at the title or badge row the purchase unlocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: i64,
    pub kind: ShopItemKind,
    pub name: String,
    pub description: Option<String>,
    pub price: DgtAmount,
    pub grants_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for shop catalog access.
#[async_trait]
pub trait ShopItemRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<ShopItem>, AppError>;

    /// Active items only, cheapest first.
    async fn find_active(&self) -> Result<Vec<ShopItem>, AppError>;

    async fn create(&self, item: &ShopItem) -> Result<ShopItem, AppError>;

    async fn set_active(&self, id: i64, active: bool) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        assert_eq!(ShopItemKind::from_str("title"), ShopItemKind::Title);
        assert_eq!(ShopItemKind::from_str("badge"), ShopItemKind::Badge);
        assert_eq!(ShopItemKind::from_str("other"), ShopItemKind::Title);
    }
}
