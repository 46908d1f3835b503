//! Wallet transaction entity and repository trait.
//!
//! Every DGT movement writes ledger rows. Transfers are double-entry: the
//! sender gets a `*_sent` row with a negative amount, each recipient a
//! `*_received` row with a positive amount, and `balance_after` snapshots
//! the balance so histories are auditable without replaying the ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::DgtAmount;
use crate::shared::error::AppError;

/// Transaction kind matching the PostgreSQL ENUM `transaction_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    TipSent,
    TipReceived,
    RainSent,
    RainReceived,
    Purchase,
    AdminAdjust,
}

impl TransactionKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "tip_sent" => Some(Self::TipSent),
            "tip_received" => Some(Self::TipReceived),
            "rain_sent" => Some(Self::RainSent),
            "rain_received" => Some(Self::RainReceived),
            "purchase" => Some(Self::Purchase),
            "admin_adjust" => Some(Self::AdminAdjust),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TipSent => "tip_sent",
            Self::TipReceived => "tip_received",
            Self::RainSent => "rain_sent",
            Self::RainReceived => "rain_received",
            Self::Purchase => "purchase",
            Self::AdminAdjust => "admin_adjust",
        }
    }
}

/// One ledger row in a user's transaction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: i64,
    pub user_id: i64,
    pub kind: TransactionKind,
    /// Signed amount in units; negative for outgoing
    pub amount: DgtAmount,
    /// Balance after this row was applied
    pub balance_after: DgtAmount,
    /// The other party for tips, None for rain/purchase/adjust
    pub counterparty_id: Option<i64>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A single credit applied during a rain event.
#[derive(Debug, Clone)]
pub struct RainShare {
    pub user_id: i64,
    pub amount: DgtAmount,
}

/// Repository trait for wallet operations.
///
/// The mutating methods run inside a single database transaction so a
/// partial transfer can never be observed. Balance checks happen under
/// row locks inside that transaction.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Current balance for a user.
    async fn balance(&self, user_id: i64) -> Result<DgtAmount, AppError>;

    /// Ledger rows for a user, newest first, keyset-paginated by id.
    async fn history(
        &self,
        user_id: i64,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<WalletTransaction>, AppError>;

    /// Move `amount` from sender to recipient, writing both ledger rows.
    /// `tx_ids` are pre-allocated Snowflake IDs for the two rows.
    async fn transfer(
        &self,
        sender_id: i64,
        recipient_id: i64,
        amount: DgtAmount,
        tx_ids: (i64, i64),
        note: Option<&str>,
    ) -> Result<(), AppError>;

    /// Debit the sender for the full distributed amount and credit every
    /// share. `sent_tx_id` is the sender's ledger row id, `share_tx_ids`
    /// one id per share, in order.
    async fn rain(
        &self,
        sender_id: i64,
        distributed: DgtAmount,
        shares: &[RainShare],
        sent_tx_id: i64,
        share_tx_ids: &[i64],
    ) -> Result<(), AppError>;

    /// Debit a purchase. The grant itself is applied by the caller in the
    /// same request after the debit succeeds.
    async fn purchase(
        &self,
        user_id: i64,
        price: DgtAmount,
        tx_id: i64,
        note: &str,
    ) -> Result<(), AppError>;

    /// Admin balance adjustment, positive or negative. Fails if it would
    /// take the balance below zero.
    async fn adjust(
        &self,
        user_id: i64,
        delta: DgtAmount,
        tx_id: i64,
        note: &str,
    ) -> Result<DgtAmount, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            TransactionKind::TipSent,
            TransactionKind::TipReceived,
            TransactionKind::RainSent,
            TransactionKind::RainReceived,
            TransactionKind::Purchase,
            TransactionKind::AdminAdjust,
        ] {
            assert_eq!(TransactionKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionKind::from_str("bogus"), None);
    }
}
