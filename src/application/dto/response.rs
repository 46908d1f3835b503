//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::{Deserialize, Serialize};

use crate::application::services::AuthTokens;
use crate::domain::services::{LevelProgress, StructureNode};
use crate::domain::{
    Badge, ForumNode, ModAction, Post, ShopItem, Shout, Thread, Title, User, WalletTransaction,
};

/// Authentication tokens response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Registration response (includes user and tokens)
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
    pub xp: i64,
    pub level: i32,
    /// Level progress, included on profile views
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<LevelProgress>,
    /// Wallet balance in units; only on the owner's own view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dgt_units: Option<i64>,
    pub equipped_title_id: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
}

impl UserResponse {
    /// Public view: no email, no balance.
    pub fn from_user(user: User) -> Self {
        Self::build(user, false)
    }

    /// Owner view: includes email and wallet balance.
    pub fn from_user_private(user: User) -> Self {
        Self::build(user, true)
    }

    fn build(user: User, private: bool) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: private.then_some(user.email),
            role: user.role.as_str().to_string(),
            xp: user.xp,
            level: user.level,
            progress: Some(crate::domain::services::leveling::progress_for_xp(user.xp)),
            dgt_units: private.then_some(user.dgt_units),
            equipped_title_id: user.equipped_title_id.map(|id| id.to_string()),
            avatar_url: user.avatar_url,
            bio: user.bio,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Forum node response (flat, without children)
#[derive(Debug, Serialize)]
pub struct ForumNodeResponse {
    pub id: String,
    pub parent_id: Option<String>,
    pub kind: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    pub xp_multiplier: f64,
    pub is_locked: bool,
    pub thread_count: i64,
    pub post_count: i64,
    pub created_at: String,
}

impl From<ForumNode> for ForumNodeResponse {
    fn from(node: ForumNode) -> Self {
        Self {
            id: node.id.to_string(),
            parent_id: node.parent_id.map(|id| id.to_string()),
            kind: node.kind.as_str().to_string(),
            name: node.name,
            slug: node.slug,
            description: node.description,
            position: node.position,
            xp_multiplier: node.xp_multiplier,
            is_locked: node.is_locked,
            thread_count: node.thread_count,
            post_count: node.post_count,
            created_at: node.created_at.to_rfc3339(),
        }
    }
}

/// Nested structure response node. Deserialize is needed for the Redis
/// structure cache round trip.
#[derive(Debug, Serialize, Deserialize)]
pub struct StructureNodeResponse {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    pub xp_multiplier: f64,
    pub thread_count: i64,
    pub post_count: i64,
    pub children: Vec<StructureNodeResponse>,
}

impl From<StructureNode> for StructureNodeResponse {
    fn from(node: StructureNode) -> Self {
        Self {
            id: node.id.to_string(),
            kind: node.kind.as_str().to_string(),
            name: node.name,
            slug: node.slug,
            description: node.description,
            position: node.position,
            xp_multiplier: node.xp_multiplier,
            thread_count: node.thread_count,
            post_count: node.post_count,
            children: node.children.into_iter().map(Into::into).collect(),
        }
    }
}

/// Thread response
#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub id: String,
    pub forum_id: String,
    pub author_id: String,
    pub title: String,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub post_count: i64,
    pub last_post_at: Option<String>,
    pub created_at: String,
}

impl From<Thread> for ThreadResponse {
    fn from(thread: Thread) -> Self {
        Self {
            id: thread.id.to_string(),
            forum_id: thread.forum_id.to_string(),
            author_id: thread.author_id.to_string(),
            title: thread.title,
            is_pinned: thread.is_pinned,
            is_locked: thread.is_locked,
            post_count: thread.post_count,
            last_post_at: thread.last_post_at.map(|t| t.to_rfc3339()),
            created_at: thread.created_at.to_rfc3339(),
        }
    }
}

/// Post response
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub thread_id: String,
    pub author_id: String,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            thread_id: post.thread_id.to_string(),
            author_id: post.author_id.to_string(),
            content: post.content,
            is_deleted: post.is_deleted,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

/// Shout response
#[derive(Debug, Serialize)]
pub struct ShoutResponse {
    pub id: String,
    pub author_id: Option<String>,
    pub kind: String,
    pub content: String,
    pub created_at: String,
}

impl From<Shout> for ShoutResponse {
    fn from(shout: Shout) -> Self {
        Self {
            id: shout.id.to_string(),
            author_id: shout.author_id.map(|id| id.to_string()),
            kind: shout.kind.as_str().to_string(),
            content: shout.content,
            created_at: shout.created_at.to_rfc3339(),
        }
    }
}

/// Shoutbox online list response
#[derive(Debug, Serialize)]
pub struct OnlineResponse {
    pub user_ids: Vec<String>,
    pub count: usize,
}

/// Wallet balance response
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub units: i64,
    pub formatted: String,
}

/// Wallet transaction response
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub kind: String,
    pub amount_units: i64,
    pub balance_after_units: i64,
    pub counterparty_id: Option<String>,
    pub note: Option<String>,
    pub created_at: String,
}

impl From<WalletTransaction> for TransactionResponse {
    fn from(tx: WalletTransaction) -> Self {
        Self {
            id: tx.id.to_string(),
            kind: tx.kind.as_str().to_string(),
            amount_units: tx.amount.units(),
            balance_after_units: tx.balance_after.units(),
            counterparty_id: tx.counterparty_id.map(|id| id.to_string()),
            note: tx.note,
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// Rain outcome response
#[derive(Debug, Serialize)]
pub struct RainResponse {
    pub recipient_count: usize,
    pub share_units: i64,
    pub distributed_units: i64,
    /// Units that could not be split evenly and stayed with the sender
    pub remainder_units: i64,
}

/// Shop item response
#[derive(Debug, Serialize)]
pub struct ShopItemResponse {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub description: Option<String>,
    pub price_units: i64,
    pub grants_id: String,
    pub is_active: bool,
}

impl From<ShopItem> for ShopItemResponse {
    fn from(item: ShopItem) -> Self {
        Self {
            id: item.id.to_string(),
            kind: item.kind.as_str().to_string(),
            name: item.name,
            description: item.description,
            price_units: item.price.units(),
            grants_id: item.grants_id.to_string(),
            is_active: item.is_active,
        }
    }
}

/// Title response
#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl From<Title> for TitleResponse {
    fn from(title: Title) -> Self {
        Self {
            id: title.id.to_string(),
            name: title.name,
            description: title.description,
            color: title.color,
        }
    }
}

/// Badge response
#[derive(Debug, Serialize)]
pub struct BadgeResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
}

impl From<Badge> for BadgeResponse {
    fn from(badge: Badge) -> Self {
        Self {
            id: badge.id.to_string(),
            name: badge.name,
            description: badge.description,
            icon_url: badge.icon_url,
        }
    }
}

/// Moderation audit log entry response
#[derive(Debug, Serialize)]
pub struct ModActionResponse {
    pub id: String,
    pub actor_id: String,
    pub kind: String,
    pub target_user_id: Option<String>,
    pub target_id: Option<String>,
    pub reason: Option<String>,
    pub created_at: String,
}

impl From<ModAction> for ModActionResponse {
    fn from(action: ModAction) -> Self {
        Self {
            id: action.id.to_string(),
            actor_id: action.actor_id.to_string(),
            kind: action.kind.as_str().to_string(),
            target_user_id: action.target_user_id.map(|id| id.to_string()),
            target_id: action.target_id.map(|id| id.to_string()),
            reason: action.reason,
            created_at: action.created_at.to_rfc3339(),
        }
    }
}

/// Leaderboard entry response. Deserialize is needed for the Redis
/// leaderboard cache round trip.
#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardEntryResponse {
    pub rank: usize,
    pub user_id: String,
    pub username: String,
    pub xp: i64,
    pub level: i32,
}
