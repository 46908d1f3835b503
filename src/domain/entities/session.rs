//! Session entity and repository trait.
//!
//! Refresh tokens are stored hashed and rotated on every refresh. A revoked
//! or expired session cannot mint new access tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A refresh-token session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    /// SHA-256 hex of the refresh token
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// A session is active when it is neither revoked nor expired.
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Repository trait for session data access.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<Session, AppError>;

    async fn find_by_token_hash(&self, hash: &str) -> Result<Option<Session>, AppError>;

    /// Rotate a session's refresh token in place.
    async fn rotate(
        &self,
        id: i64,
        new_hash: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    async fn revoke(&self, id: i64) -> Result<(), AppError>;

    /// Revoke every session for a user (logout everywhere).
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError>;
}
