//! Shop flow tests: catalog ordering, purchases with wallet debits and
//! cosmetic grants, ownership rules, and title equipping.

use std::sync::Arc;

use chrono::Utc;

use degentalk::application::services::{ShopError, ShopService, ShopServiceImpl};
use degentalk::domain::{Badge, ShopItemKind, TransactionKind};

use crate::common::{
    self, FakeCosmeticRepository, FakeShopItemRepository, FakeUserRepository, FakeWalletRepository,
};

type Svc = ShopServiceImpl<
    FakeShopItemRepository,
    FakeCosmeticRepository,
    FakeWalletRepository,
    FakeUserRepository,
>;

fn service(
    items: Arc<FakeShopItemRepository>,
    cosmetics: Arc<FakeCosmeticRepository>,
    wallets: Arc<FakeWalletRepository>,
    users: Arc<FakeUserRepository>,
) -> Svc {
    ShopServiceImpl::new(items, cosmetics, wallets, users, common::id_gen())
}

#[tokio::test]
async fn catalog_lists_active_items_cheapest_first() {
    let items = FakeShopItemRepository::with_items(vec![
        common::shop_item(1, ShopItemKind::Title, 500, 11),
        common::shop_item(2, ShopItemKind::Badge, 100, 21),
        {
            let mut retired = common::shop_item(3, ShopItemKind::Title, 50, 12);
            retired.is_active = false;
            retired
        },
    ]);
    let svc = service(
        items,
        FakeCosmeticRepository::with_titles(vec![]),
        FakeWalletRepository::with_balances(vec![]),
        FakeUserRepository::new(),
    );

    let catalog = svc.catalog().await.expect("catalog failed");
    let ids: Vec<i64> = catalog.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn purchasing_a_title_debits_and_grants() {
    let items =
        FakeShopItemRepository::with_items(vec![common::shop_item(1, ShopItemKind::Title, 300, 11)]);
    let cosmetics = FakeCosmeticRepository::with_titles(vec![common::title(11, "Certified Degen")]);
    let wallets = FakeWalletRepository::with_balances(vec![(7, 500)]);
    let svc = service(
        items,
        cosmetics.clone(),
        wallets.clone(),
        FakeUserRepository::with_users(vec![common::funded_user(7, "buyer", 500)]),
    );

    let item = svc.purchase(7, 1).await.expect("purchase failed");
    assert_eq!(item.id, 1);

    assert_eq!(wallets.balance_units(7), 200);
    assert!(cosmetics.owns_title(7, 11));

    let rows = wallets.ledger_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, TransactionKind::Purchase);
    assert_eq!(rows[0].amount.units(), -300);
}

#[tokio::test]
async fn purchasing_a_badge_grants_it() {
    let items =
        FakeShopItemRepository::with_items(vec![common::shop_item(1, ShopItemKind::Badge, 100, 21)]);
    let cosmetics = FakeCosmeticRepository::with_titles(vec![]);
    cosmetics.add_badge(Badge {
        id: 21,
        name: "Early Degen".to_string(),
        description: None,
        icon_url: None,
        created_at: Utc::now(),
    });
    let svc = service(
        items,
        cosmetics.clone(),
        FakeWalletRepository::with_balances(vec![(7, 500)]),
        FakeUserRepository::with_users(vec![common::funded_user(7, "buyer", 500)]),
    );

    svc.purchase(7, 1).await.expect("purchase failed");
    assert!(cosmetics.owns_badge(7, 21));
    assert_eq!(
        svc.owned_badges(7).await.expect("owned_badges failed").len(),
        1
    );
}

#[tokio::test]
async fn owned_titles_cannot_be_repurchased() {
    let items =
        FakeShopItemRepository::with_items(vec![common::shop_item(1, ShopItemKind::Title, 300, 11)]);
    let cosmetics = FakeCosmeticRepository::with_titles(vec![common::title(11, "Certified Degen")]);
    let wallets = FakeWalletRepository::with_balances(vec![(7, 1000)]);
    let svc = service(
        items,
        cosmetics,
        wallets.clone(),
        FakeUserRepository::with_users(vec![common::funded_user(7, "buyer", 1000)]),
    );

    svc.purchase(7, 1).await.expect("first purchase failed");
    let err = svc.purchase(7, 1).await.unwrap_err();
    assert!(matches!(err, ShopError::AlreadyOwned));

    // Only the first purchase was charged
    assert_eq!(wallets.balance_units(7), 700);
}

#[tokio::test]
async fn owned_badges_cannot_be_repurchased() {
    let items =
        FakeShopItemRepository::with_items(vec![common::shop_item(1, ShopItemKind::Badge, 100, 21)]);
    let cosmetics = FakeCosmeticRepository::with_titles(vec![]);
    cosmetics.add_badge(Badge {
        id: 21,
        name: "Early Degen".to_string(),
        description: None,
        icon_url: None,
        created_at: Utc::now(),
    });
    let wallets = FakeWalletRepository::with_balances(vec![(7, 500)]);
    let svc = service(
        items,
        cosmetics,
        wallets.clone(),
        FakeUserRepository::with_users(vec![common::funded_user(7, "buyer", 500)]),
    );

    svc.purchase(7, 1).await.expect("first purchase failed");
    let err = svc.purchase(7, 1).await.unwrap_err();
    assert!(matches!(err, ShopError::AlreadyOwned));

    // The second attempt must not debit the wallet again
    assert_eq!(wallets.balance_units(7), 400);
    assert_eq!(wallets.ledger_rows().len(), 1);
}

#[tokio::test]
async fn retired_items_are_not_for_sale() {
    let mut retired = common::shop_item(1, ShopItemKind::Title, 300, 11);
    retired.is_active = false;
    let svc = service(
        FakeShopItemRepository::with_items(vec![retired]),
        FakeCosmeticRepository::with_titles(vec![]),
        FakeWalletRepository::with_balances(vec![(7, 1000)]),
        FakeUserRepository::new(),
    );

    let err = svc.purchase(7, 1).await.unwrap_err();
    assert!(matches!(err, ShopError::ItemInactive));
}

#[tokio::test]
async fn unknown_items_are_reported() {
    let svc = service(
        FakeShopItemRepository::with_items(vec![]),
        FakeCosmeticRepository::with_titles(vec![]),
        FakeWalletRepository::with_balances(vec![]),
        FakeUserRepository::new(),
    );

    let err = svc.purchase(7, 404).await.unwrap_err();
    assert!(matches!(err, ShopError::ItemNotFound));
}

#[tokio::test]
async fn purchase_requires_sufficient_balance() {
    let items =
        FakeShopItemRepository::with_items(vec![common::shop_item(1, ShopItemKind::Title, 300, 11)]);
    let cosmetics = FakeCosmeticRepository::with_titles(vec![common::title(11, "Certified Degen")]);
    let svc = service(
        items,
        cosmetics.clone(),
        FakeWalletRepository::with_balances(vec![(7, 100)]),
        FakeUserRepository::with_users(vec![common::funded_user(7, "buyer", 100)]),
    );

    let err = svc.purchase(7, 1).await.unwrap_err();
    assert!(matches!(err, ShopError::InsufficientBalance));
    assert!(!cosmetics.owns_title(7, 11));
}

#[tokio::test]
async fn equipping_requires_ownership() {
    let users = FakeUserRepository::with_users(vec![common::user(7, "buyer")]);
    let cosmetics = FakeCosmeticRepository::with_titles(vec![common::title(11, "Certified Degen")]);
    let svc = service(
        FakeShopItemRepository::with_items(vec![]),
        cosmetics.clone(),
        FakeWalletRepository::with_balances(vec![]),
        users.clone(),
    );

    let err = svc.equip_title(7, Some(11)).await.unwrap_err();
    assert!(matches!(err, ShopError::TitleNotOwned));

    use degentalk::domain::CosmeticRepository;
    cosmetics.grant_title(7, 11).await.expect("grant failed");

    svc.equip_title(7, Some(11)).await.expect("equip failed");
    assert_eq!(users.get(7).and_then(|u| u.equipped_title_id), Some(11));

    // None unequips
    svc.equip_title(7, None).await.expect("unequip failed");
    assert_eq!(users.get(7).and_then(|u| u.equipped_title_id), None);
}
