//! Wallet Service
//!
//! Tips, rain, balances, and transaction history. Rain recipients are the
//! users currently present in the shoutbox minus the sender; the amount is
//! split evenly in integer units and any remainder stays with the sender.
//! Tips and rain are announced in the shoutbox as server shouts.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::shoutbox_service::ShoutboxService;
use crate::config::RainSettings;
use crate::domain::value_objects::DgtAmount;
use crate::domain::{
    RainShare, ShoutKind, User, UserRepository, WalletRepository, WalletTransaction,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Wallet service errors
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Recipient not found")]
    RecipientNotFound,

    #[error("Cannot tip yourself")]
    SelfTip,

    #[error("Amount below minimum: {0}")]
    BelowMinimum(String),

    #[error("Nobody is around to receive rain")]
    NoRecipients,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for WalletError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::InsufficientBalance => WalletError::InsufficientBalance,
            e => WalletError::Internal(e.to_string()),
        }
    }
}

/// Result of a rain event.
#[derive(Debug, Clone, Serialize)]
pub struct RainOutcome {
    pub recipient_count: usize,
    pub share: DgtAmount,
    pub distributed: DgtAmount,
    pub remainder: DgtAmount,
}

/// Wallet service trait for dependency injection
#[async_trait]
pub trait WalletService: Send + Sync {
    /// Current balance.
    async fn balance(&self, user_id: i64) -> Result<DgtAmount, WalletError>;

    /// Transaction history, newest first.
    async fn history(
        &self,
        user_id: i64,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<WalletTransaction>, WalletError>;

    /// Tip another user.
    async fn tip(
        &self,
        sender: &User,
        recipient_id: i64,
        amount: DgtAmount,
        note: Option<&str>,
    ) -> Result<(), WalletError>;

    /// Rain on everyone present in the shoutbox.
    async fn rain(&self, sender: &User, amount: DgtAmount) -> Result<RainOutcome, WalletError>;
}

/// WalletService implementation
pub struct WalletServiceImpl<W, U, SB>
where
    W: WalletRepository,
    U: UserRepository,
    SB: ShoutboxService,
{
    wallet_repo: Arc<W>,
    user_repo: Arc<U>,
    shoutbox: Arc<SB>,
    id_generator: Arc<SnowflakeGenerator>,
    rain_settings: RainSettings,
}

impl<W, U, SB> WalletServiceImpl<W, U, SB>
where
    W: WalletRepository,
    U: UserRepository,
    SB: ShoutboxService,
{
    pub fn new(
        wallet_repo: Arc<W>,
        user_repo: Arc<U>,
        shoutbox: Arc<SB>,
        id_generator: Arc<SnowflakeGenerator>,
        rain_settings: RainSettings,
    ) -> Self {
        Self {
            wallet_repo,
            user_repo,
            shoutbox,
            id_generator,
            rain_settings,
        }
    }
}

#[async_trait]
impl<W, U, SB> WalletService for WalletServiceImpl<W, U, SB>
where
    W: WalletRepository + 'static,
    U: UserRepository + 'static,
    SB: ShoutboxService + 'static,
{
    async fn balance(&self, user_id: i64) -> Result<DgtAmount, WalletError> {
        Ok(self.wallet_repo.balance(user_id).await?)
    }

    async fn history(
        &self,
        user_id: i64,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<WalletTransaction>, WalletError> {
        Ok(self.wallet_repo.history(user_id, limit, before).await?)
    }

    async fn tip(
        &self,
        sender: &User,
        recipient_id: i64,
        amount: DgtAmount,
        note: Option<&str>,
    ) -> Result<(), WalletError> {
        if recipient_id == sender.id {
            return Err(WalletError::SelfTip);
        }
        if !amount.is_positive() {
            return Err(WalletError::BelowMinimum("Tip must be positive".into()));
        }

        let recipient = self
            .user_repo
            .find_by_id(recipient_id)
            .await
            .map_err(WalletError::from)?
            .ok_or(WalletError::RecipientNotFound)?;

        let tx_ids = (self.id_generator.generate(), self.id_generator.generate());
        self.wallet_repo
            .transfer(sender.id, recipient_id, amount, tx_ids, note)
            .await?;

        metrics::DGT_TIPPED_UNITS_TOTAL.inc_by(amount.units() as u64);

        let announcement = format!(
            "{} tipped {} {}",
            sender.username, recipient.username, amount
        );
        if let Err(e) = self
            .shoutbox
            .emit_system_shout(ShoutKind::Tip, &announcement)
            .await
        {
            tracing::warn!("Failed to announce tip in shoutbox: {}", e);
        }

        tracing::info!(
            sender_id = sender.id,
            recipient_id,
            units = amount.units(),
            "Tip completed"
        );

        Ok(())
    }

    async fn rain(&self, sender: &User, amount: DgtAmount) -> Result<RainOutcome, WalletError> {
        if amount.units() < self.rain_settings.min_amount_units {
            return Err(WalletError::BelowMinimum(format!(
                "Rain requires at least {} units",
                self.rain_settings.min_amount_units
            )));
        }

        let mut present = self
            .shoutbox
            .online()
            .await
            .map_err(|e| WalletError::Internal(e.to_string()))?;
        present.retain(|&id| id != sender.id);
        // Presence set order is arbitrary; id order keeps payouts and
        // row locking deterministic
        present.sort_unstable();
        present.truncate(self.rain_settings.max_recipients as usize);

        if present.is_empty() {
            return Err(WalletError::NoRecipients);
        }

        let (share, remainder) = amount.split_even(present.len() as u32);
        if !share.is_positive() {
            return Err(WalletError::BelowMinimum(
                "Amount too small to split among everyone present".into(),
            ));
        }
        let distributed = DgtAmount::from_units(share.units() * present.len() as i64);

        let shares: Vec<RainShare> = present
            .iter()
            .map(|&user_id| RainShare {
                user_id,
                amount: share,
            })
            .collect();
        let sent_tx_id = self.id_generator.generate();
        let share_tx_ids: Vec<i64> = shares.iter().map(|_| self.id_generator.generate()).collect();

        self.wallet_repo
            .rain(sender.id, distributed, &shares, sent_tx_id, &share_tx_ids)
            .await?;

        metrics::RAIN_EVENTS_TOTAL.inc();

        let announcement = format!(
            "{} made it rain {} on {} degens",
            sender.username,
            distributed,
            shares.len()
        );
        if let Err(e) = self
            .shoutbox
            .emit_system_shout(ShoutKind::Rain, &announcement)
            .await
        {
            tracing::warn!("Failed to announce rain in shoutbox: {}", e);
        }

        tracing::info!(
            sender_id = sender.id,
            recipients = shares.len(),
            distributed_units = distributed.units(),
            remainder_units = remainder.units(),
            "Rain completed"
        );

        Ok(RainOutcome {
            recipient_count: shares.len(),
            share,
            distributed,
            remainder,
        })
    }
}
