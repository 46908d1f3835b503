//! XP award pipeline tests: base XP scaling, multiplier sanitizing under
//! the configured policy, truncation, and level recomputation.

use std::sync::Arc;

use degentalk::application::services::{EconomyService, EconomyServiceImpl, XpAction};
use degentalk::domain::services::EnforcementMode;
use degentalk::domain::{NodeKind, UserRole};

use crate::common::{self, FakeUserRepository};

fn service(users: Arc<FakeUserRepository>) -> EconomyServiceImpl<FakeUserRepository> {
    EconomyServiceImpl::new(users, common::economy_settings())
}

#[tokio::test]
async fn post_xp_scales_with_role_and_forum_multipliers() {
    let author = common::user_with_role(1, "modster", UserRole::Moderator);
    let users = FakeUserRepository::with_users(vec![author.clone()]);
    let forum = common::forum_node(10, NodeKind::Forum, 1.5);

    let award = service(users.clone())
        .award_xp(&author, XpAction::CreatePost, Some(&forum))
        .await
        .expect("award failed");

    // 25 base * (1.25 role * 1.5 forum) = 46.875, truncated to 46
    assert_eq!(award.xp_awarded, 46);
    assert_eq!(award.new_total_xp, 46);
    assert!(award.multiplier.violations.is_empty());
    assert_eq!(users.get(1).map(|u| u.xp), Some(46));
}

#[tokio::test]
async fn strict_policy_caps_runaway_forum_multiplier() {
    let mut settings = common::economy_settings();
    settings.role_multiplier_admin = 2.0;

    let author = common::user_with_role(1, "boss", UserRole::Admin);
    let users = FakeUserRepository::with_users(vec![author.clone()]);
    let svc = EconomyServiceImpl::new(users.clone(), settings);
    let forum = common::forum_node(10, NodeKind::Forum, 10.0);

    let award = svc
        .award_xp(&author, XpAction::CreateThread, Some(&forum))
        .await
        .expect("award failed");

    // Forum source capped at 3.0, combined 6.0 capped at the total 5.0
    assert_eq!(award.xp_awarded, 250);
    assert!(award.multiplier.capped);
    assert!(award.multiplier.has_violations());
    assert!(award.multiplier.raw_multiplier > 5.0);
}

#[tokio::test]
async fn warn_policy_reports_violations_without_capping() {
    let mut settings = common::economy_settings();
    settings.multiplier.enforcement = EnforcementMode::Warn;

    let author = common::user(1, "degen");
    let users = FakeUserRepository::with_users(vec![author.clone()]);
    let svc = EconomyServiceImpl::new(users, settings);
    let forum = common::forum_node(10, NodeKind::Forum, 10.0);

    let award = svc
        .award_xp(&author, XpAction::CreateThread, Some(&forum))
        .await
        .expect("award failed");

    // Uncapped 1.0 * 10.0 applies, but the violations are still recorded
    assert_eq!(award.xp_awarded, 500);
    assert!(!award.multiplier.capped);
    assert!(award.multiplier.has_violations());
}

#[tokio::test]
async fn shout_xp_ignores_forum_multiplier() {
    let author = common::user(1, "degen");
    let users = FakeUserRepository::with_users(vec![author.clone()]);

    let award = service(users)
        .award_xp(&author, XpAction::Shout, None)
        .await
        .expect("award failed");

    assert_eq!(award.xp_awarded, 2);
    assert!((award.multiplier.final_multiplier - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn below_floor_forum_multiplier_is_raised() {
    let author = common::user(1, "degen");
    let users = FakeUserRepository::with_users(vec![author.clone()]);
    let forum = common::forum_node(10, NodeKind::Forum, 0.25);

    let award = service(users)
        .award_xp(&author, XpAction::CreatePost, Some(&forum))
        .await
        .expect("award failed");

    // A nerfed forum can never reduce XP below the base award
    assert_eq!(award.xp_awarded, 25);
    assert!(award.multiplier.has_violations());
}

#[tokio::test]
async fn crossing_a_level_threshold_sets_the_flag() {
    let mut author = common::user(1, "degen");
    author.xp = 90;
    let users = FakeUserRepository::with_users(vec![author.clone()]);

    let award = service(users.clone())
        .award_xp(&author, XpAction::CreatePost, Some(&common::forum_node(10, NodeKind::Forum, 1.0)))
        .await
        .expect("award failed");

    // 90 + 25 = 115 crosses the level 1 threshold at 100
    assert_eq!(award.new_total_xp, 115);
    assert_eq!(award.new_level, 1);
    assert!(award.leveled_up);
    assert_eq!(users.get(1).map(|u| u.level), Some(1));
}

#[tokio::test]
async fn stale_caller_level_does_not_understate_the_stored_level() {
    // The caller's snapshot predates other awards: the stored row already
    // holds 300 XP while the snapshot still says 0
    let mut stored = common::user(1, "degen");
    stored.xp = 300;
    stored.level = 2;
    let users = FakeUserRepository::with_users(vec![stored]);
    let stale_snapshot = common::user(1, "degen");

    let award = service(users.clone())
        .award_xp(
            &stale_snapshot,
            XpAction::CreatePost,
            Some(&common::forum_node(10, NodeKind::Forum, 1.0)),
        )
        .await
        .expect("award failed");

    // 300 + 25 = 325 stays within level 2 (threshold 250)
    assert_eq!(award.new_total_xp, 325);
    assert_eq!(award.new_level, 2);
    assert_eq!(users.get(1).map(|u| u.level), Some(2));
}

#[tokio::test]
async fn award_within_a_level_does_not_flag() {
    let mut author = common::user(1, "degen");
    author.xp = 200;
    author.level = 1;
    let users = FakeUserRepository::with_users(vec![author.clone()]);

    let award = service(users)
        .award_xp(&author, XpAction::Shout, None)
        .await
        .expect("award failed");

    assert_eq!(award.new_total_xp, 202);
    assert_eq!(award.new_level, 1);
    assert!(!award.leveled_up);
}
