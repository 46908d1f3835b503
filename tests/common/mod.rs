//! Common Test Utilities
//!
//! In-memory repository fakes and fixture builders shared by the
//! service-level integration tests. The fakes honor the same contracts as
//! the Postgres implementations (balance checks, idempotent grants, soft
//! deletes) so services can be exercised end to end without a database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use degentalk::application::services::{ShoutboxError, ShoutboxService, XpAward};
use degentalk::config::{
    EconomySettings, JwtSettings, MultiplierSettings, RainSettings,
};
use degentalk::domain::services::{
    level_for_xp, EnforcementMode, MultiplierOutcome, StackingRule,
};
use degentalk::domain::value_objects::DgtAmount;
use degentalk::domain::{
    Badge, CosmeticRepository, ForumNode, ForumNodeRepository, NodeKind, Post, PostRepository,
    RainShare, Session, SessionRepository, ShopItem, ShopItemRepository, Shout, ShoutKind, Thread,
    ThreadRepository, Title, TransactionKind, User, UserRepository, UserRole, WalletRepository,
    WalletTransaction,
};
use degentalk::shared::error::AppError;
use degentalk::shared::snowflake::SnowflakeGenerator;

// ---------------------------------------------------------------------------
// Fixture builders
// ---------------------------------------------------------------------------

pub fn id_gen() -> Arc<SnowflakeGenerator> {
    Arc::new(SnowflakeGenerator::new(1, 1))
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-secret-0123456789abcdef".to_string(),
        access_token_expiry_minutes: 15,
        refresh_token_expiry_days: 7,
    }
}

pub fn economy_settings() -> EconomySettings {
    EconomySettings {
        thread_xp: 50,
        post_xp: 25,
        shout_xp: 2,
        role_multiplier_user: 1.0,
        role_multiplier_moderator: 1.25,
        role_multiplier_admin: 1.5,
        multiplier: MultiplierSettings {
            stacking: StackingRule::Multiplicative,
            enforcement: EnforcementMode::Strict,
            max_per_source: 3.0,
            max_total: 5.0,
            role_weight: 0.5,
            forum_weight: 0.5,
        },
    }
}

pub fn rain_settings() -> RainSettings {
    RainSettings {
        min_amount_units: 100,
        max_recipients: 25,
        presence_ttl_secs: 300,
    }
}

pub fn user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: String::new(),
        ..User::default()
    }
}

pub fn user_with_role(id: i64, username: &str, role: UserRole) -> User {
    User {
        role,
        ..user(id, username)
    }
}

pub fn funded_user(id: i64, username: &str, dgt_units: i64) -> User {
    User {
        dgt_units,
        ..user(id, username)
    }
}

pub fn forum_node(id: i64, kind: NodeKind, xp_multiplier: f64) -> ForumNode {
    let now = Utc::now();
    ForumNode {
        id,
        parent_id: None,
        kind,
        name: format!("Node {}", id),
        slug: format!("node-{}", id),
        description: None,
        position: 0,
        xp_multiplier,
        is_locked: false,
        thread_count: 0,
        post_count: 0,
        created_at: now,
        updated_at: now,
    }
}

pub fn shop_item(id: i64, kind: degentalk::domain::ShopItemKind, price_units: i64, grants_id: i64) -> ShopItem {
    ShopItem {
        id,
        kind,
        name: format!("Item {}", id),
        description: None,
        price: DgtAmount::from_units(price_units),
        grants_id,
        is_active: true,
        created_at: Utc::now(),
    }
}

pub fn title(id: i64, name: &str) -> Title {
    Title {
        id,
        name: name.to_string(),
        description: None,
        color: None,
        created_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// User repository fake
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeUserRepository {
    users: Mutex<HashMap<i64, User>>,
}

impl FakeUserRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_users(users: Vec<User>) -> Arc<Self> {
        let repo = Self::default();
        {
            let mut map = repo.users.lock();
            for user in users {
                map.insert(user.id, user);
            }
        }
        Arc::new(repo)
    }

    /// Direct read for assertions.
    pub fn get(&self, id: i64) -> Option<User> {
        self.users.lock().get(&id).cloned()
    }
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        self.users.lock().insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update_profile(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.lock();
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        stored.avatar_url = user.avatar_url.clone();
        stored.bio = user.bio.clone();
        stored.equipped_title_id = user.equipped_title_id;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.users.lock().values().any(|u| u.email == email))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.users.lock().values().any(|u| u.username == username))
    }

    async fn add_xp(&self, id: i64, delta: i64) -> Result<User, AppError> {
        let mut users = self.users.lock();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user.xp += delta;
        // Same contract as Postgres: level comes from the stored total
        // and never goes down
        user.level = user.level.max(level_for_xp(user.xp));
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn top_by_xp(&self, limit: i32) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.lock().values().cloned().collect();
        users.sort_by(|a, b| b.xp.cmp(&a.xp).then(a.id.cmp(&b.id)));
        users.truncate(limit.max(0) as usize);
        Ok(users)
    }

    async fn list(&self, limit: i32, offset: i64) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.lock().values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn set_role(&self, id: i64, role: UserRole) -> Result<(), AppError> {
        let mut users = self.users.lock();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user.role = role;
        Ok(())
    }

    async fn set_equipped_title(&self, id: i64, title_id: Option<i64>) -> Result<(), AppError> {
        let mut users = self.users.lock();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user.equipped_title_id = title_id;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Session repository fake
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeSessionRepository {
    sessions: Mutex<Vec<Session>>,
}

impl FakeSessionRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl SessionRepository for FakeSessionRepository {
    async fn create(&self, session: &Session) -> Result<Session, AppError> {
        self.sessions.lock().push(session.clone());
        Ok(session.clone())
    }

    async fn find_by_token_hash(&self, hash: &str) -> Result<Option<Session>, AppError> {
        Ok(self
            .sessions
            .lock()
            .iter()
            .find(|s| s.refresh_token_hash == hash)
            .cloned())
    }

    async fn rotate(
        &self,
        id: i64,
        new_hash: &str,
        new_expires_at: chrono::DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound("Session not found".into()))?;
        session.refresh_token_hash = new_hash.to_string();
        session.expires_at = new_expires_at;
        Ok(())
    }

    async fn revoke(&self, id: i64) -> Result<(), AppError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound("Session not found".into()))?;
        session.revoked_at = Some(Utc::now());
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        let mut sessions = self.sessions.lock();
        let mut revoked = 0;
        for session in sessions
            .iter_mut()
            .filter(|s| s.user_id == user_id && s.revoked_at.is_none())
        {
            session.revoked_at = Some(Utc::now());
            revoked += 1;
        }
        Ok(revoked)
    }
}

// ---------------------------------------------------------------------------
// Forum node repository fake
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeForumNodeRepository {
    nodes: Mutex<HashMap<i64, ForumNode>>,
}

impl FakeForumNodeRepository {
    pub fn with_nodes(nodes: Vec<ForumNode>) -> Arc<Self> {
        let repo = Self::default();
        {
            let mut map = repo.nodes.lock();
            for node in nodes {
                map.insert(node.id, node);
            }
        }
        Arc::new(repo)
    }

    pub fn get(&self, id: i64) -> Option<ForumNode> {
        self.nodes.lock().get(&id).cloned()
    }
}

#[async_trait]
impl ForumNodeRepository for FakeForumNodeRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ForumNode>, AppError> {
        Ok(self.nodes.lock().get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ForumNode>, AppError> {
        Ok(self
            .nodes
            .lock()
            .values()
            .find(|n| n.slug == slug)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<ForumNode>, AppError> {
        Ok(self.nodes.lock().values().cloned().collect())
    }

    async fn create(&self, node: &ForumNode) -> Result<ForumNode, AppError> {
        self.nodes.lock().insert(node.id, node.clone());
        Ok(node.clone())
    }

    async fn update(&self, node: &ForumNode) -> Result<ForumNode, AppError> {
        self.nodes.lock().insert(node.id, node.clone());
        Ok(node.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut nodes = self.nodes.lock();
        if nodes.values().any(|n| n.parent_id == Some(id)) {
            return Err(AppError::Conflict("Node still has children".into()));
        }
        nodes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Node not found".into()))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        Ok(self.nodes.lock().values().any(|n| n.slug == slug))
    }

    async fn increment_counts(
        &self,
        id: i64,
        thread_delta: i64,
        post_delta: i64,
    ) -> Result<(), AppError> {
        let mut nodes = self.nodes.lock();
        let node = nodes
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Node not found".into()))?;
        node.thread_count += thread_delta;
        node.post_count += post_delta;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Thread and post repository fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeThreadRepository {
    threads: Mutex<HashMap<i64, Thread>>,
}

impl FakeThreadRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_threads(threads: Vec<Thread>) -> Arc<Self> {
        let repo = Self::default();
        {
            let mut map = repo.threads.lock();
            for thread in threads {
                map.insert(thread.id, thread);
            }
        }
        Arc::new(repo)
    }

    pub fn get(&self, id: i64) -> Option<Thread> {
        self.threads.lock().get(&id).cloned()
    }
}

#[async_trait]
impl ThreadRepository for FakeThreadRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Thread>, AppError> {
        Ok(self.threads.lock().get(&id).cloned())
    }

    async fn create(&self, thread: &Thread) -> Result<Thread, AppError> {
        self.threads.lock().insert(thread.id, thread.clone());
        Ok(thread.clone())
    }

    async fn find_by_forum(
        &self,
        forum_id: i64,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<Thread>, AppError> {
        let mut threads: Vec<Thread> = self
            .threads
            .lock()
            .values()
            .filter(|t| t.forum_id == forum_id)
            .filter(|t| before.is_none_or(|b| t.id < b))
            .cloned()
            .collect();
        threads.sort_by(|a, b| b.is_pinned.cmp(&a.is_pinned).then(b.id.cmp(&a.id)));
        threads.truncate(limit.max(0) as usize);
        Ok(threads)
    }

    async fn set_pinned(&self, id: i64, pinned: bool) -> Result<(), AppError> {
        let mut threads = self.threads.lock();
        let thread = threads
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Thread not found".into()))?;
        thread.is_pinned = pinned;
        Ok(())
    }

    async fn set_locked(&self, id: i64, locked: bool) -> Result<(), AppError> {
        let mut threads = self.threads.lock();
        let thread = threads
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Thread not found".into()))?;
        thread.is_locked = locked;
        Ok(())
    }

    async fn record_post(&self, id: i64, at: chrono::DateTime<Utc>) -> Result<(), AppError> {
        let mut threads = self.threads.lock();
        let thread = threads
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Thread not found".into()))?;
        thread.post_count += 1;
        thread.last_post_at = Some(at);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakePostRepository {
    posts: Mutex<HashMap<i64, Post>>,
}

impl FakePostRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_posts(posts: Vec<Post>) -> Arc<Self> {
        let repo = Self::default();
        {
            let mut map = repo.posts.lock();
            for post in posts {
                map.insert(post.id, post);
            }
        }
        Arc::new(repo)
    }

    pub fn get(&self, id: i64) -> Option<Post> {
        self.posts.lock().get(&id).cloned()
    }
}

#[async_trait]
impl PostRepository for FakePostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        Ok(self.posts.lock().get(&id).cloned())
    }

    async fn create(&self, post: &Post) -> Result<Post, AppError> {
        self.posts.lock().insert(post.id, post.clone());
        Ok(post.clone())
    }

    async fn find_by_thread(
        &self,
        thread_id: i64,
        limit: i32,
        after: Option<i64>,
    ) -> Result<Vec<Post>, AppError> {
        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .values()
            .filter(|p| p.thread_id == thread_id)
            .filter(|p| after.is_none_or(|a| p.id > a))
            .cloned()
            .collect();
        posts.sort_by_key(|p| p.id);
        posts.truncate(limit.max(0) as usize);
        Ok(posts)
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<Post, AppError> {
        let mut posts = self.posts.lock();
        let post = posts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
        post.content = content.to_string();
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let mut posts = self.posts.lock();
        let post = posts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
        post.is_deleted = true;
        post.content = String::new();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wallet repository fake
// ---------------------------------------------------------------------------

/// In-memory double-entry ledger. Balance checks mirror the Postgres
/// implementation: a debit that would go negative fails the whole call.
#[derive(Default)]
pub struct FakeWalletRepository {
    balances: Mutex<HashMap<i64, i64>>,
    ledger: Mutex<Vec<WalletTransaction>>,
}

impl FakeWalletRepository {
    pub fn with_balances(balances: Vec<(i64, i64)>) -> Arc<Self> {
        let repo = Self::default();
        {
            let mut map = repo.balances.lock();
            for (user_id, units) in balances {
                map.insert(user_id, units);
            }
        }
        Arc::new(repo)
    }

    pub fn balance_units(&self, user_id: i64) -> i64 {
        *self.balances.lock().get(&user_id).unwrap_or(&0)
    }

    pub fn ledger_rows(&self) -> Vec<WalletTransaction> {
        self.ledger.lock().clone()
    }

    fn apply(
        &self,
        user_id: i64,
        kind: TransactionKind,
        delta_units: i64,
        tx_id: i64,
        counterparty_id: Option<i64>,
        note: Option<&str>,
    ) -> Result<i64, AppError> {
        let mut balances = self.balances.lock();
        let balance = balances.entry(user_id).or_insert(0);
        let new_balance = *balance + delta_units;
        if new_balance < 0 {
            return Err(AppError::InsufficientBalance);
        }
        *balance = new_balance;

        self.ledger.lock().push(WalletTransaction {
            id: tx_id,
            user_id,
            kind,
            amount: DgtAmount::from_units(delta_units),
            balance_after: DgtAmount::from_units(new_balance),
            counterparty_id,
            note: note.map(str::to_string),
            created_at: Utc::now(),
        });
        Ok(new_balance)
    }
}

#[async_trait]
impl WalletRepository for FakeWalletRepository {
    async fn balance(&self, user_id: i64) -> Result<DgtAmount, AppError> {
        Ok(DgtAmount::from_units(self.balance_units(user_id)))
    }

    async fn history(
        &self,
        user_id: i64,
        limit: i32,
        before: Option<i64>,
    ) -> Result<Vec<WalletTransaction>, AppError> {
        let mut rows: Vec<WalletTransaction> = self
            .ledger
            .lock()
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| before.is_none_or(|b| t.id < b))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn transfer(
        &self,
        sender_id: i64,
        recipient_id: i64,
        amount: DgtAmount,
        tx_ids: (i64, i64),
        note: Option<&str>,
    ) -> Result<(), AppError> {
        self.apply(
            sender_id,
            TransactionKind::TipSent,
            -amount.units(),
            tx_ids.0,
            Some(recipient_id),
            note,
        )?;
        self.apply(
            recipient_id,
            TransactionKind::TipReceived,
            amount.units(),
            tx_ids.1,
            Some(sender_id),
            note,
        )?;
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
        self.apply(
            sender_id,
            TransactionKind::RainSent,
            -distributed.units(),
            sent_tx_id,
            None,
            None,
        )?;
        for (share, tx_id) in shares.iter().zip(share_tx_ids) {
            self.apply(
                share.user_id,
                TransactionKind::RainReceived,
                share.amount.units(),
                *tx_id,
                Some(sender_id),
                None,
            )?;
        }
        Ok(())
    }

    async fn purchase(
        &self,
        user_id: i64,
        price: DgtAmount,
        tx_id: i64,
        note: &str,
    ) -> Result<(), AppError> {
        self.apply(
            user_id,
            TransactionKind::Purchase,
            -price.units(),
            tx_id,
            None,
            Some(note),
        )?;
        Ok(())
    }

    async fn adjust(
        &self,
        user_id: i64,
        delta: DgtAmount,
        tx_id: i64,
        note: &str,
    ) -> Result<DgtAmount, AppError> {
        let new_balance = self.apply(
            user_id,
            TransactionKind::AdminAdjust,
            delta.units(),
            tx_id,
            None,
            Some(note),
        )?;
        Ok(DgtAmount::from_units(new_balance))
    }
}

// ---------------------------------------------------------------------------
// Shop and cosmetics fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeShopItemRepository {
    items: Mutex<HashMap<i64, ShopItem>>,
}

impl FakeShopItemRepository {
    pub fn with_items(items: Vec<ShopItem>) -> Arc<Self> {
        let repo = Self::default();
        {
            let mut map = repo.items.lock();
            for item in items {
                map.insert(item.id, item);
            }
        }
        Arc::new(repo)
    }
}

#[async_trait]
impl ShopItemRepository for FakeShopItemRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ShopItem>, AppError> {
        Ok(self.items.lock().get(&id).cloned())
    }

    async fn find_active(&self) -> Result<Vec<ShopItem>, AppError> {
        let mut items: Vec<ShopItem> = self
            .items
            .lock()
            .values()
            .filter(|i| i.is_active)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn create(&self, item: &ShopItem) -> Result<ShopItem, AppError> {
        self.items.lock().insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<(), AppError> {
        let mut items = self.items.lock();
        let item = items
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Item not found".into()))?;
        item.is_active = active;
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCosmeticRepository {
    titles: Mutex<HashMap<i64, Title>>,
    badges: Mutex<HashMap<i64, Badge>>,
    user_titles: Mutex<Vec<(i64, i64)>>,
    user_badges: Mutex<Vec<(i64, i64)>>,
}

impl FakeCosmeticRepository {
    pub fn with_titles(titles: Vec<Title>) -> Arc<Self> {
        let repo = Self::default();
        {
            let mut map = repo.titles.lock();
            for title in titles {
                map.insert(title.id, title);
            }
        }
        Arc::new(repo)
    }

    pub fn add_badge(&self, badge: Badge) {
        self.badges.lock().insert(badge.id, badge);
    }

    pub fn owns_title(&self, user_id: i64, title_id: i64) -> bool {
        self.user_titles
            .lock()
            .contains(&(user_id, title_id))
    }

    pub fn owns_badge(&self, user_id: i64, badge_id: i64) -> bool {
        self.user_badges
            .lock()
            .contains(&(user_id, badge_id))
    }
}

#[async_trait]
impl CosmeticRepository for FakeCosmeticRepository {
    async fn find_title(&self, id: i64) -> Result<Option<Title>, AppError> {
        Ok(self.titles.lock().get(&id).cloned())
    }

    async fn create_title(&self, title: &Title) -> Result<Title, AppError> {
        self.titles.lock().insert(title.id, title.clone());
        Ok(title.clone())
    }

    async fn titles_for_user(&self, user_id: i64) -> Result<Vec<Title>, AppError> {
        let owned = self.user_titles.lock();
        let titles = self.titles.lock();
        Ok(owned
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, tid)| titles.get(tid).cloned())
            .collect())
    }

    async fn badges_for_user(&self, user_id: i64) -> Result<Vec<Badge>, AppError> {
        let owned = self.user_badges.lock();
        let badges = self.badges.lock();
        Ok(owned
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, bid)| badges.get(bid).cloned())
            .collect())
    }

    async fn grant_title(&self, user_id: i64, title_id: i64) -> Result<(), AppError> {
        let mut owned = self.user_titles.lock();
        if !owned.contains(&(user_id, title_id)) {
            owned.push((user_id, title_id));
        }
        Ok(())
    }

    async fn grant_badge(&self, user_id: i64, badge_id: i64) -> Result<(), AppError> {
        let mut owned = self.user_badges.lock();
        if !owned.contains(&(user_id, badge_id)) {
            owned.push((user_id, badge_id));
        }
        Ok(())
    }

    async fn user_owns_title(&self, user_id: i64, title_id: i64) -> Result<bool, AppError> {
        Ok(self.owns_title(user_id, title_id))
    }

    async fn user_owns_badge(&self, user_id: i64, badge_id: i64) -> Result<bool, AppError> {
        Ok(self.owns_badge(user_id, badge_id))
    }
}

// ---------------------------------------------------------------------------
// Shoutbox service fake
// ---------------------------------------------------------------------------

/// Stands in for the shoutbox when testing the wallet service. Presence is
/// a fixed list and system announcements are recorded for assertions.
pub struct FakeShoutbox {
    online_ids: Vec<i64>,
    announcements: Mutex<Vec<(ShoutKind, String)>>,
    next_id: Mutex<i64>,
}

impl FakeShoutbox {
    pub fn with_online(online_ids: Vec<i64>) -> Arc<Self> {
        Arc::new(Self {
            online_ids,
            announcements: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
        })
    }

    pub fn announcements(&self) -> Vec<(ShoutKind, String)> {
        self.announcements.lock().clone()
    }

    fn make_shout(&self, author_id: Option<i64>, kind: ShoutKind, content: &str) -> Shout {
        let mut next = self.next_id.lock();
        let id = *next;
        *next += 1;
        Shout {
            id,
            author_id,
            kind,
            content: content.to_string(),
            is_deleted: false,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ShoutboxService for FakeShoutbox {
    async fn shout(&self, author: &User, content: &str) -> Result<(Shout, XpAward), ShoutboxError> {
        let shout = self.make_shout(Some(author.id), ShoutKind::User, content);
        let award = XpAward {
            xp_awarded: 0,
            new_total_xp: author.xp,
            new_level: author.level,
            leveled_up: false,
            multiplier: MultiplierOutcome {
                final_multiplier: 1.0,
                raw_multiplier: 1.0,
                capped: false,
                violations: Vec::new(),
            },
        };
        Ok((shout, award))
    }

    async fn emit_system_shout(
        &self,
        kind: ShoutKind,
        content: &str,
    ) -> Result<Shout, ShoutboxError> {
        self.announcements
            .lock()
            .push((kind, content.to_string()));
        Ok(self.make_shout(None, kind, content))
    }

    async fn recent(&self, _limit: i32) -> Result<Vec<Shout>, ShoutboxError> {
        Ok(Vec::new())
    }

    async fn poll(
        &self,
        _caller_id: Option<i64>,
        _after: i64,
        _limit: i32,
    ) -> Result<Vec<Shout>, ShoutboxError> {
        Ok(Vec::new())
    }

    async fn online(&self) -> Result<Vec<i64>, ShoutboxError> {
        Ok(self.online_ids.clone())
    }
}
