//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// User role enum matching the PostgreSQL ENUM `user_role`.
///
/// Roles drive both authorization (moderator/admin route guards) and the
/// role-based XP multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Moderator,
    Admin,
}

impl UserRole {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "moderator" => Self::Moderator,
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    /// Whether this role may perform moderation actions.
    pub fn can_moderate(&self) -> bool {
        matches!(self, Self::Moderator | Self::Admin)
    }

    /// Whether this role may access the admin back office.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a Degentalk user account.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - role: user_role NOT NULL DEFAULT 'user'
/// - xp: BIGINT NOT NULL DEFAULT 0
/// - level: INT NOT NULL DEFAULT 0
/// - dgt_units: BIGINT NOT NULL DEFAULT 0 (ledger balance, never negative)
/// - equipped_title_id: BIGINT NULL
/// - avatar_url: TEXT NULL
/// - bio: TEXT NULL
/// - created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Username (2-32 characters, unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Authorization role
    #[serde(default)]
    pub role: UserRole,

    /// Lifetime XP
    pub xp: i64,

    /// Current level, derived from XP
    pub level: i32,

    /// DGT wallet balance in integer units
    pub dgt_units: i64,

    /// Currently equipped title, if any
    pub equipped_title_id: Option<i64>,

    /// URL to user's avatar image
    pub avatar_url: Option<String>,

    /// User's bio/about me text
    pub bio: Option<String>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check whether the user may moderate.
    pub fn can_moderate(&self) -> bool {
        self.role.can_moderate()
    }
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            username: String::new(),
            email: String::new(),
            password_hash: String::new(),
            role: UserRole::default(),
            xp: 0,
            level: 0,
            dgt_units: 0,
            equipped_title_id: None,
            avatar_url: None,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for User data access operations.
///
/// Implementations of this trait handle the actual database interactions.
/// The trait is defined in the domain layer to maintain dependency inversion.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Create a new user in the database.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Update profile fields (avatar, bio, equipped title).
    async fn update_profile(&self, user: &User) -> Result<User, AppError>;

    /// Check if an email address is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Check if a username is already taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// Atomically add XP and recompute the level from the post-update total.
    ///
    /// The level never decreases. Returns the updated user row.
    async fn add_xp(&self, id: i64, delta: i64) -> Result<User, AppError>;

    /// Top users by lifetime XP (leaderboard).
    async fn top_by_xp(&self, limit: i32) -> Result<Vec<User>, AppError>;

    /// List users (admin back office, offset pagination).
    async fn list(&self, limit: i32, offset: i64) -> Result<Vec<User>, AppError>;

    /// Set the user's role.
    async fn set_role(&self, id: i64, role: UserRole) -> Result<(), AppError>;

    /// Set the equipped title (None to unequip).
    async fn set_equipped_title(&self, id: i64, title_id: Option<i64>) -> Result<(), AppError>;
}
