//! Shop Item Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::value_objects::DgtAmount;
use crate::domain::{ShopItem, ShopItemKind, ShopItemRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ShopItemRow {
    id: i64,
    kind: String,
    name: String,
    description: Option<String>,
    price_units: i64,
    grants_id: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl ShopItemRow {
    fn into_item(self) -> ShopItem {
        ShopItem {
            id: self.id,
            kind: ShopItemKind::from_str(&self.kind),
            name: self.name,
            description: self.description,
            price: DgtAmount::from_units(self.price_units),
            grants_id: self.grants_id,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

const ITEM_COLUMNS: &str =
    "id, kind::TEXT AS kind, name, description, price_units, grants_id, is_active, created_at";

/// PostgreSQL shop item repository implementation.
#[derive(Clone)]
pub struct PgShopItemRepository {
    pool: PgPool,
}

impl PgShopItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShopItemRepository for PgShopItemRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ShopItem>, AppError> {
        let row = sqlx::query_as::<_, ShopItemRow>(&format!(
            "SELECT {} FROM shop_items WHERE id = $1",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_item()))
    }

    async fn find_active(&self) -> Result<Vec<ShopItem>, AppError> {
        let rows = sqlx::query_as::<_, ShopItemRow>(&format!(
            r#"
            SELECT {} FROM shop_items
            WHERE is_active = TRUE
            ORDER BY price_units ASC, id ASC
            "#,
            ITEM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_item()).collect())
    }

    async fn create(&self, item: &ShopItem) -> Result<ShopItem, AppError> {
        let row = sqlx::query_as::<_, ShopItemRow>(&format!(
            r#"
            INSERT INTO shop_items (id, kind, name, description, price_units, grants_id, is_active)
            VALUES ($1, $2::shop_item_kind, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(item.id)
        .bind(item.kind.as_str())
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price.units())
        .bind(item.grants_id)
        .bind(item.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_item())
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE shop_items SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Shop item with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
