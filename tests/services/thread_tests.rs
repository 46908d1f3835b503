//! Thread and post flow tests: creation, counter bookkeeping, lock
//! enforcement, author-only edits, and the XP awards along the way.

use std::sync::Arc;

use chrono::Utc;

use degentalk::application::services::{
    EconomyServiceImpl, ThreadError, ThreadService, ThreadServiceImpl,
};
use degentalk::domain::{NodeKind, Thread, ThreadRepository};

use crate::common::{
    self, FakeForumNodeRepository, FakePostRepository, FakeThreadRepository, FakeUserRepository,
};

type Svc = ThreadServiceImpl<
    FakeThreadRepository,
    FakePostRepository,
    FakeForumNodeRepository,
    EconomyServiceImpl<FakeUserRepository>,
>;

struct Fixture {
    threads: Arc<FakeThreadRepository>,
    posts: Arc<FakePostRepository>,
    forums: Arc<FakeForumNodeRepository>,
    users: Arc<FakeUserRepository>,
    svc: Svc,
}

fn fixture(forums: Arc<FakeForumNodeRepository>, users: Arc<FakeUserRepository>) -> Fixture {
    let threads = FakeThreadRepository::new();
    let posts = FakePostRepository::new();
    let economy = Arc::new(EconomyServiceImpl::new(
        users.clone(),
        common::economy_settings(),
    ));
    let svc = ThreadServiceImpl::new(
        threads.clone(),
        posts.clone(),
        forums.clone(),
        economy,
        common::id_gen(),
    );
    Fixture {
        threads,
        posts,
        forums,
        users,
        svc,
    }
}

fn plain_thread(id: i64, forum_id: i64, author_id: i64) -> Thread {
    let now = Utc::now();
    Thread {
        id,
        forum_id,
        author_id,
        title: "gm".to_string(),
        is_pinned: false,
        is_locked: false,
        post_count: 0,
        last_post_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn create_thread_awards_xp_and_bumps_counters() {
    let author = common::user(1, "degen");
    let fx = fixture(
        FakeForumNodeRepository::with_nodes(vec![common::forum_node(10, NodeKind::Forum, 1.0)]),
        FakeUserRepository::with_users(vec![author.clone()]),
    );

    let (thread, post, award) = fx
        .svc
        .create_thread(&author, 10, "wen moon", "probably never")
        .await
        .expect("create_thread failed");

    assert_eq!(thread.forum_id, 10);
    assert_eq!(post.thread_id, thread.id);
    assert_eq!(award.xp_awarded, 50);

    let forum = fx.forums.get(10).expect("forum vanished");
    assert_eq!(forum.thread_count, 1);
    assert_eq!(forum.post_count, 1);

    // The opening post counts toward the thread's counter
    let stored = fx.threads.get(thread.id).expect("thread vanished");
    assert_eq!(stored.post_count, 1);
    assert!(stored.last_post_at.is_some());

    assert_eq!(fx.users.get(1).map(|u| u.xp), Some(50));
}

#[tokio::test]
async fn zones_reject_thread_creation() {
    let author = common::user(1, "degen");
    let fx = fixture(
        FakeForumNodeRepository::with_nodes(vec![common::forum_node(10, NodeKind::Zone, 1.0)]),
        FakeUserRepository::with_users(vec![author.clone()]),
    );

    let err = fx
        .svc
        .create_thread(&author, 10, "wen moon", "probably never")
        .await
        .unwrap_err();
    assert!(matches!(err, ThreadError::NotAThreadTarget));
}

#[tokio::test]
async fn locked_forums_reject_new_threads() {
    let author = common::user(1, "degen");
    let mut forum = common::forum_node(10, NodeKind::Forum, 1.0);
    forum.is_locked = true;
    let fx = fixture(
        FakeForumNodeRepository::with_nodes(vec![forum]),
        FakeUserRepository::with_users(vec![author.clone()]),
    );

    let err = fx
        .svc
        .create_thread(&author, 10, "wen moon", "probably never")
        .await
        .unwrap_err();
    assert!(matches!(err, ThreadError::ForumLocked));
    // No XP on a rejected thread
    assert_eq!(fx.users.get(1).map(|u| u.xp), Some(0));
}

#[tokio::test]
async fn unknown_forum_is_reported() {
    let author = common::user(1, "degen");
    let fx = fixture(
        FakeForumNodeRepository::with_nodes(vec![]),
        FakeUserRepository::with_users(vec![author.clone()]),
    );

    let err = fx
        .svc
        .create_thread(&author, 404, "wen moon", "probably never")
        .await
        .unwrap_err();
    assert!(matches!(err, ThreadError::ForumNotFound));
}

#[tokio::test]
async fn reply_scales_xp_by_forum_multiplier() {
    let author = common::user(1, "degen");
    let fx = fixture(
        FakeForumNodeRepository::with_nodes(vec![common::forum_node(10, NodeKind::Subforum, 2.0)]),
        FakeUserRepository::with_users(vec![author.clone()]),
    );
    fx.threads
        .create(&plain_thread(100, 10, 2))
        .await
        .expect("seed thread failed");

    let (post, award) = fx
        .svc
        .create_post(&author, 100, "ngmi")
        .await
        .expect("create_post failed");

    assert_eq!(post.author_id, 1);
    // 25 base * 2.0 forum multiplier
    assert_eq!(award.xp_awarded, 50);

    let forum = fx.forums.get(10).expect("forum vanished");
    assert_eq!(forum.thread_count, 0);
    assert_eq!(forum.post_count, 1);
}

#[tokio::test]
async fn locked_threads_reject_replies() {
    let author = common::user(1, "degen");
    let fx = fixture(
        FakeForumNodeRepository::with_nodes(vec![common::forum_node(10, NodeKind::Forum, 1.0)]),
        FakeUserRepository::with_users(vec![author.clone()]),
    );
    let mut thread = plain_thread(100, 10, 2);
    thread.is_locked = true;
    fx.threads.create(&thread).await.expect("seed thread failed");

    let err = fx.svc.create_post(&author, 100, "ngmi").await.unwrap_err();
    assert!(matches!(err, ThreadError::ThreadLocked));
    assert_eq!(fx.users.get(1).map(|u| u.xp), Some(0));
}

#[tokio::test]
async fn only_the_author_may_edit_a_post() {
    let author = common::user(1, "degen");
    let fx = fixture(
        FakeForumNodeRepository::with_nodes(vec![common::forum_node(10, NodeKind::Forum, 1.0)]),
        FakeUserRepository::with_users(vec![author.clone()]),
    );
    fx.threads
        .create(&plain_thread(100, 10, 1))
        .await
        .expect("seed thread failed");
    let (post, _) = fx
        .svc
        .create_post(&author, 100, "first draft")
        .await
        .expect("create_post failed");

    let err = fx.svc.edit_post(99, post.id, "hijacked").await.unwrap_err();
    assert!(matches!(err, ThreadError::NotAuthor));

    let edited = fx
        .svc
        .edit_post(1, post.id, "second draft")
        .await
        .expect("author edit failed");
    assert_eq!(edited.content, "second draft");
    assert_eq!(fx.posts.get(post.id).map(|p| p.content), Some("second draft".into()));
}

#[tokio::test]
async fn list_threads_puts_pinned_first() {
    let fx = fixture(
        FakeForumNodeRepository::with_nodes(vec![common::forum_node(10, NodeKind::Forum, 1.0)]),
        FakeUserRepository::new(),
    );
    fx.threads
        .create(&plain_thread(100, 10, 1))
        .await
        .expect("seed failed");
    fx.threads
        .create(&plain_thread(200, 10, 1))
        .await
        .expect("seed failed");
    let mut pinned = plain_thread(50, 10, 1);
    pinned.is_pinned = true;
    fx.threads.create(&pinned).await.expect("seed failed");

    let threads = fx
        .svc
        .list_threads(10, 25, None)
        .await
        .expect("list_threads failed");
    let ids: Vec<i64> = threads.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![50, 200, 100]);
}

#[tokio::test]
async fn missing_thread_lookup_fails() {
    let fx = fixture(
        FakeForumNodeRepository::with_nodes(vec![]),
        FakeUserRepository::new(),
    );
    let err = fx.svc.get_thread(404).await.unwrap_err();
    assert!(matches!(err, ThreadError::ThreadNotFound));
}
