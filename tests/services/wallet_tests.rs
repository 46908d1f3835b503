//! Wallet flow tests: tipping, rain distribution, balance enforcement,
//! ledger rows, and shoutbox announcements.

use std::sync::Arc;

use degentalk::application::services::{WalletError, WalletService, WalletServiceImpl};
use degentalk::config::RainSettings;
use degentalk::domain::value_objects::DgtAmount;
use degentalk::domain::{ShoutKind, TransactionKind};

use crate::common::{self, FakeShoutbox, FakeUserRepository, FakeWalletRepository};

type Svc = WalletServiceImpl<FakeWalletRepository, FakeUserRepository, FakeShoutbox>;

fn service(
    wallets: Arc<FakeWalletRepository>,
    users: Arc<FakeUserRepository>,
    shoutbox: Arc<FakeShoutbox>,
    rain: RainSettings,
) -> Svc {
    WalletServiceImpl::new(wallets, users, shoutbox, common::id_gen(), rain)
}

#[tokio::test]
async fn tip_moves_balance_and_writes_both_ledger_rows() {
    let sender = common::funded_user(1, "whale", 1000);
    let recipient = common::user(2, "shrimp");
    let wallets = FakeWalletRepository::with_balances(vec![(1, 1000)]);
    let users = FakeUserRepository::with_users(vec![sender.clone(), recipient]);
    let shoutbox = FakeShoutbox::with_online(vec![]);
    let svc = service(
        wallets.clone(),
        users,
        shoutbox.clone(),
        common::rain_settings(),
    );

    svc.tip(&sender, 2, DgtAmount::from_units(250), Some("gm"))
        .await
        .expect("tip failed");

    assert_eq!(wallets.balance_units(1), 750);
    assert_eq!(wallets.balance_units(2), 250);

    let rows = wallets.ledger_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].kind, TransactionKind::TipSent);
    assert_eq!(rows[0].amount.units(), -250);
    assert_eq!(rows[0].counterparty_id, Some(2));
    assert_eq!(rows[1].kind, TransactionKind::TipReceived);
    assert_eq!(rows[1].amount.units(), 250);
    assert_eq!(rows[1].balance_after.units(), 250);

    let announcements = shoutbox.announcements();
    assert_eq!(announcements.len(), 1);
    assert_eq!(announcements[0].0, ShoutKind::Tip);
    assert!(announcements[0].1.contains("whale"));
    assert!(announcements[0].1.contains("shrimp"));
}

#[tokio::test]
async fn tipping_yourself_is_rejected() {
    let sender = common::funded_user(1, "whale", 1000);
    let svc = service(
        FakeWalletRepository::with_balances(vec![(1, 1000)]),
        FakeUserRepository::with_users(vec![sender.clone()]),
        FakeShoutbox::with_online(vec![]),
        common::rain_settings(),
    );

    let err = svc
        .tip(&sender, 1, DgtAmount::from_units(100), None)
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::SelfTip));
}

#[tokio::test]
async fn tip_requires_an_existing_recipient() {
    let sender = common::funded_user(1, "whale", 1000);
    let svc = service(
        FakeWalletRepository::with_balances(vec![(1, 1000)]),
        FakeUserRepository::with_users(vec![sender.clone()]),
        FakeShoutbox::with_online(vec![]),
        common::rain_settings(),
    );

    let err = svc
        .tip(&sender, 404, DgtAmount::from_units(100), None)
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::RecipientNotFound));
}

#[tokio::test]
async fn tip_cannot_overdraw_the_sender() {
    let sender = common::funded_user(1, "whale", 50);
    let recipient = common::user(2, "shrimp");
    let wallets = FakeWalletRepository::with_balances(vec![(1, 50)]);
    let svc = service(
        wallets.clone(),
        FakeUserRepository::with_users(vec![sender.clone(), recipient]),
        FakeShoutbox::with_online(vec![]),
        common::rain_settings(),
    );

    let err = svc
        .tip(&sender, 2, DgtAmount::from_units(100), None)
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::InsufficientBalance));
    assert_eq!(wallets.balance_units(1), 50);
}

#[tokio::test]
async fn zero_tips_are_rejected() {
    let sender = common::funded_user(1, "whale", 1000);
    let svc = service(
        FakeWalletRepository::with_balances(vec![(1, 1000)]),
        FakeUserRepository::with_users(vec![sender.clone()]),
        FakeShoutbox::with_online(vec![]),
        common::rain_settings(),
    );

    let err = svc
        .tip(&sender, 2, DgtAmount::ZERO, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::BelowMinimum(_)));
}

#[tokio::test]
async fn rain_splits_evenly_and_keeps_the_remainder() {
    let sender = common::funded_user(1, "whale", 10_000);
    let wallets = FakeWalletRepository::with_balances(vec![(1, 10_000)]);
    let shoutbox = FakeShoutbox::with_online(vec![2, 3, 4]);
    let svc = service(
        wallets.clone(),
        FakeUserRepository::with_users(vec![sender.clone()]),
        shoutbox.clone(),
        common::rain_settings(),
    );

    let outcome = svc
        .rain(&sender, DgtAmount::from_units(1000))
        .await
        .expect("rain failed");

    assert_eq!(outcome.recipient_count, 3);
    assert_eq!(outcome.share.units(), 333);
    assert_eq!(outcome.distributed.units(), 999);
    assert_eq!(outcome.remainder.units(), 1);

    // Only the distributed amount leaves the sender
    assert_eq!(wallets.balance_units(1), 10_000 - 999);
    for recipient in [2, 3, 4] {
        assert_eq!(wallets.balance_units(recipient), 333);
    }

    let announcements = shoutbox.announcements();
    assert_eq!(announcements.len(), 1);
    assert_eq!(announcements[0].0, ShoutKind::Rain);
}

#[tokio::test]
async fn rain_credits_recipients_in_ascending_id_order() {
    let sender = common::funded_user(1, "whale", 10_000);
    let wallets = FakeWalletRepository::with_balances(vec![(1, 10_000)]);
    // Presence comes back in arbitrary order
    let shoutbox = FakeShoutbox::with_online(vec![4, 2, 3]);
    let svc = service(
        wallets.clone(),
        FakeUserRepository::with_users(vec![sender.clone()]),
        shoutbox,
        common::rain_settings(),
    );

    svc.rain(&sender, DgtAmount::from_units(900))
        .await
        .expect("rain failed");

    let received: Vec<i64> = wallets
        .ledger_rows()
        .iter()
        .filter(|r| r.kind == TransactionKind::RainReceived)
        .map(|r| r.user_id)
        .collect();
    assert_eq!(received, vec![2, 3, 4]);
}

#[tokio::test]
async fn rain_excludes_the_sender_from_recipients() {
    let sender = common::funded_user(1, "whale", 10_000);
    let wallets = FakeWalletRepository::with_balances(vec![(1, 10_000)]);
    let shoutbox = FakeShoutbox::with_online(vec![1, 2, 3]);
    let svc = service(
        wallets.clone(),
        FakeUserRepository::with_users(vec![sender.clone()]),
        shoutbox,
        common::rain_settings(),
    );

    let outcome = svc
        .rain(&sender, DgtAmount::from_units(1000))
        .await
        .expect("rain failed");

    assert_eq!(outcome.recipient_count, 2);
    assert_eq!(wallets.balance_units(2), 500);
    assert_eq!(wallets.balance_units(3), 500);
}

#[tokio::test]
async fn rain_respects_the_recipient_cap() {
    let sender = common::funded_user(1, "whale", 10_000);
    let mut settings = common::rain_settings();
    settings.max_recipients = 2;
    let wallets = FakeWalletRepository::with_balances(vec![(1, 10_000)]);
    let svc = service(
        wallets.clone(),
        FakeUserRepository::with_users(vec![sender.clone()]),
        FakeShoutbox::with_online(vec![2, 3, 4, 5]),
        settings,
    );

    let outcome = svc
        .rain(&sender, DgtAmount::from_units(1000))
        .await
        .expect("rain failed");
    assert_eq!(outcome.recipient_count, 2);
}

#[tokio::test]
async fn rain_below_minimum_is_rejected() {
    let sender = common::funded_user(1, "whale", 10_000);
    let svc = service(
        FakeWalletRepository::with_balances(vec![(1, 10_000)]),
        FakeUserRepository::with_users(vec![sender.clone()]),
        FakeShoutbox::with_online(vec![2, 3]),
        common::rain_settings(),
    );

    let err = svc
        .rain(&sender, DgtAmount::from_units(50))
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::BelowMinimum(_)));
}

#[tokio::test]
async fn rain_with_an_empty_room_is_rejected() {
    let sender = common::funded_user(1, "whale", 10_000);
    let svc = service(
        FakeWalletRepository::with_balances(vec![(1, 10_000)]),
        FakeUserRepository::with_users(vec![sender.clone()]),
        FakeShoutbox::with_online(vec![1]),
        common::rain_settings(),
    );

    let err = svc
        .rain(&sender, DgtAmount::from_units(1000))
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::NoRecipients));
}

#[tokio::test]
async fn history_returns_newest_first() {
    let sender = common::funded_user(1, "whale", 1000);
    let recipient = common::user(2, "shrimp");
    let wallets = FakeWalletRepository::with_balances(vec![(1, 1000)]);
    let svc = service(
        wallets,
        FakeUserRepository::with_users(vec![sender.clone(), recipient]),
        FakeShoutbox::with_online(vec![]),
        common::rain_settings(),
    );

    svc.tip(&sender, 2, DgtAmount::from_units(100), None)
        .await
        .expect("tip failed");
    svc.tip(&sender, 2, DgtAmount::from_units(200), None)
        .await
        .expect("tip failed");

    let history = svc.history(1, 10, None).await.expect("history failed");
    assert_eq!(history.len(), 2);
    assert!(history[0].id > history[1].id);
    assert_eq!(history[0].amount.units(), -200);
    assert_eq!(history[1].amount.units(), -100);
}
