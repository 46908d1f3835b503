//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Update profile request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    pub avatar_url: Option<String>,

    #[validate(length(max = 190, message = "Bio must be at most 190 characters"))]
    pub bio: Option<String>,
}

/// Equip (or unequip) an owned title
#[derive(Debug, Deserialize)]
pub struct EquipTitleRequest {
    /// None unequips the current title
    pub title_id: Option<String>,
}

/// Create forum node request (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateForumNodeRequest {
    pub parent_id: Option<String>,

    /// "zone", "forum" or "subforum"
    pub kind: String,

    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    #[validate(length(min = 2, max = 64, message = "Slug must be 2-64 characters"))]
    pub slug: String,

    pub description: Option<String>,
    pub position: Option<i32>,
    pub xp_multiplier: Option<f64>,
}

/// Update forum node request (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateForumNodeRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
    pub position: Option<i32>,
    pub xp_multiplier: Option<f64>,
    pub is_locked: Option<bool>,
}

/// Create thread request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateThreadRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 20000, message = "Content must be 1-20000 characters"))]
    pub content: String,
}

/// Create post request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 20000, message = "Content must be 1-20000 characters"))]
    pub content: String,
}

/// Edit post request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 20000, message = "Content must be 1-20000 characters"))]
    pub content: String,
}

/// Shoutbox message request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateShoutRequest {
    #[validate(length(min = 1, max = 500, message = "Content must be 1-500 characters"))]
    pub content: String,
}

/// Shoutbox poll query parameters
#[derive(Debug, Deserialize)]
pub struct ShoutQueryParams {
    /// Return shouts with id greater than this cursor
    pub after: Option<String>,
    pub limit: Option<i32>,
}

/// Thread listing query parameters
#[derive(Debug, Deserialize)]
pub struct ThreadQueryParams {
    pub before: Option<String>,
    pub limit: Option<i32>,
}

/// Post listing query parameters
#[derive(Debug, Deserialize)]
pub struct PostQueryParams {
    pub after: Option<String>,
    pub limit: Option<i32>,
}

/// Wallet history query parameters
#[derive(Debug, Deserialize)]
pub struct HistoryQueryParams {
    pub before: Option<String>,
    pub limit: Option<i32>,
}

/// Tip request
#[derive(Debug, Deserialize, Validate)]
pub struct TipRequest {
    pub recipient_id: String,

    /// Amount in DGT units (100 units = 1 DGT)
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_units: i64,

    #[validate(length(max = 200, message = "Note must be at most 200 characters"))]
    pub note: Option<String>,
}

/// Rain request
#[derive(Debug, Deserialize, Validate)]
pub struct RainRequest {
    /// Total amount to distribute, in DGT units
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_units: i64,
}

/// Shop purchase request
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub item_id: String,
}

/// Admin balance adjustment request
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustBalanceRequest {
    /// Signed delta in DGT units
    pub delta_units: i64,

    #[validate(length(min = 3, max = 200, message = "Reason must be 3-200 characters"))]
    pub reason: String,
}

/// Admin role change request
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    /// "user", "moderator" or "admin"
    pub role: String,
}

/// Moderation action request carrying an optional reason
#[derive(Debug, Deserialize, Validate)]
pub struct ModReasonRequest {
    #[validate(length(max = 200, message = "Reason must be at most 200 characters"))]
    pub reason: Option<String>,
}

/// Admin title grant request
#[derive(Debug, Deserialize)]
pub struct GrantTitleRequest {
    pub user_id: String,
    pub title_id: String,
}

/// Admin shop item creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateShopItemRequest {
    /// "title" or "badge"
    pub kind: String,

    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[validate(range(min = 1, message = "Price must be positive"))]
    pub price_units: i64,

    pub grants_id: String,
}
