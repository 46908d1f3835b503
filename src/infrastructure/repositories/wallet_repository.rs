//! Wallet Repository Implementation
//!
//! PostgreSQL implementation of the WalletRepository trait. Every mutating
//! method runs inside a single database transaction; balances are read
//! under FOR UPDATE row locks so concurrent transfers cannot double-spend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::value_objects::DgtAmount;
use crate::domain::{RainShare, TransactionKind, WalletRepository, WalletTransaction};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    user_id: i64,
    kind: String,
    amount_units: i64,
    balance_after: i64,
    counterparty_id: Option<i64>,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_transaction(self) -> Result<WalletTransaction, AppError> {
        let kind = TransactionKind::from_str(&self.kind).ok_or_else(|| {
            AppError::Internal(format!("Unknown transaction kind '{}'", self.kind))
        })?;
        Ok(WalletTransaction {
            id: self.id,
            user_id: self.user_id,
            kind,
            amount: DgtAmount::from_units(self.amount_units),
            balance_after: DgtAmount::from_units(self.balance_after),
            counterparty_id: self.counterparty_id,
            note: self.note,
            created_at: self.created_at,
        })
    }
}

/// PostgreSQL wallet repository implementation.
#[derive(Clone)]
pub struct PgWalletRepository {
    pool: PgPool,
}

impl PgWalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock a user row and return its current balance in units.
    async fn lock_balance(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
    ) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT dgt_units FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
    }

    /// Apply a signed delta to a locked user row and return the new balance.
    async fn apply_delta(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        delta_units: i64,
    ) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET dgt_units = dgt_units + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING dgt_units
            "#,
        )
        .bind(user_id)
        .bind(delta_units)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::Database)
    }

    /// Write one ledger row inside the transaction.
    #[allow(clippy::too_many_arguments)]
    async fn write_ledger_row(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        user_id: i64,
        kind: TransactionKind,
        amount_units: i64,
        balance_after: i64,
        counterparty_id: Option<i64>,
        note: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO wallet_transactions
                (id, user_id, kind, amount_units, balance_after, counterparty_id, note)
            VALUES ($1, $2, $3::transaction_kind, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(kind.as_str())
        .bind(amount_units)
        .bind(balance_after)
        .bind(counterparty_id)
        .bind(note)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl WalletRepository for PgWalletRepository {
    async fn balance(&self, user_id: i64) -> Result<DgtAmount, AppError> {
        let units = sqlx::query_scalar::<_, i64>("SELECT dgt_units FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))?;

        Ok(DgtAmount::from_units(units))
    }

    async fn history(
        &self,
        user_id: i64,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<WalletTransaction>, AppError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, user_id, kind::TEXT AS kind, amount_units, balance_after,
                   counterparty_id, note, created_at
            FROM wallet_transactions
            WHERE user_id = $1 AND id < $2
            ORDER BY id DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(before.unwrap_or(i64::MAX))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_transaction()).collect()
    }

    async fn transfer(
        &self,
        sender_id: i64,
        recipient_id: i64,
        amount: DgtAmount,
        tx_ids: (i64, i64),
        note: Option<&str>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock in id order to avoid deadlocks between crossing tips
        let (first, second) = if sender_id < recipient_id {
            (sender_id, recipient_id)
        } else {
            (recipient_id, sender_id)
        };
        let first_balance = Self::lock_balance(&mut tx, first).await?;
        let second_balance = Self::lock_balance(&mut tx, second).await?;

        let sender_balance = if first == sender_id {
            first_balance
        } else {
            second_balance
        };
        if sender_balance < amount.units() {
            return Err(AppError::InsufficientBalance);
        }

        let sender_after = Self::apply_delta(&mut tx, sender_id, -amount.units()).await?;
        let recipient_after = Self::apply_delta(&mut tx, recipient_id, amount.units()).await?;

        Self::write_ledger_row(
            &mut tx,
            tx_ids.0,
            sender_id,
            TransactionKind::TipSent,
            -amount.units(),
            sender_after,
            Some(recipient_id),
            note,
        )
        .await?;
        Self::write_ledger_row(
            &mut tx,
            tx_ids.1,
            recipient_id,
            TransactionKind::TipReceived,
            amount.units(),
            recipient_after,
            Some(sender_id),
            note,
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn rain(
        &self,
        sender_id: i64,
        distributed: DgtAmount,
        shares: &[RainShare],
        sent_tx_id: i64,
        share_tx_ids: &[i64],
    ) -> Result<(), AppError> {
        if shares.len() != share_tx_ids.len() {
            return Err(AppError::Internal(
                "Rain share and ledger id counts differ".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let sender_balance = Self::lock_balance(&mut tx, sender_id).await?;
        if sender_balance < distributed.units() {
            return Err(AppError::InsufficientBalance);
        }

        let sender_after = Self::apply_delta(&mut tx, sender_id, -distributed.units()).await?;
        Self::write_ledger_row(
            &mut tx,
            sent_tx_id,
            sender_id,
            TransactionKind::RainSent,
            -distributed.units(),
            sender_after,
            None,
            None,
        )
        .await?;

        // Credit in id order so overlapping rains cannot deadlock
        let mut entries: Vec<(&RainShare, i64)> =
            shares.iter().zip(share_tx_ids.iter().copied()).collect();
        entries.sort_by_key(|(share, _)| share.user_id);

        for (share, tx_id) in entries {
            let after = Self::apply_delta(&mut tx, share.user_id, share.amount.units()).await?;
            Self::write_ledger_row(
                &mut tx,
                tx_id,
                share.user_id,
                TransactionKind::RainReceived,
                share.amount.units(),
                after,
                Some(sender_id),
                None,
            )
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn purchase(
        &self,
        user_id: i64,
        price: DgtAmount,
        tx_id: i64,
        note: &str,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let balance = Self::lock_balance(&mut tx, user_id).await?;
        if balance < price.units() {
            return Err(AppError::InsufficientBalance);
        }

        let after = Self::apply_delta(&mut tx, user_id, -price.units()).await?;
        Self::write_ledger_row(
            &mut tx,
            tx_id,
            user_id,
            TransactionKind::Purchase,
            -price.units(),
            after,
            None,
            Some(note),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn adjust(
        &self,
        user_id: i64,
        delta: DgtAmount,
        tx_id: i64,
        note: &str,
    ) -> Result<DgtAmount, AppError> {
        let mut tx = self.pool.begin().await?;

        let balance = Self::lock_balance(&mut tx, user_id).await?;
        if balance + delta.units() < 0 {
            return Err(AppError::InsufficientBalance);
        }

        let after = Self::apply_delta(&mut tx, user_id, delta.units()).await?;
        Self::write_ledger_row(
            &mut tx,
            tx_id,
            user_id,
            TransactionKind::AdminAdjust,
            delta.units(),
            after,
            None,
            Some(note),
        )
        .await?;

        tx.commit().await?;
        Ok(DgtAmount::from_units(after))
    }
}
