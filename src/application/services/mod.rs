//! Application Services
//!
//! Use-case orchestration over the domain repositories. Each service is a
//! trait plus a generic implementation so handlers and tests can inject
//! repositories freely.

pub mod auth_service;
pub mod economy_service;
pub mod forum_service;
pub mod moderation_service;
pub mod shop_service;
pub mod shoutbox_service;
pub mod thread_service;
pub mod wallet_service;

pub use auth_service::{AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims};
pub use economy_service::{EconomyService, EconomyServiceImpl, XpAction, XpAward};
pub use forum_service::{ForumError, ForumService, ForumServiceImpl};
pub use moderation_service::{ModerationError, ModerationService, ModerationServiceImpl};
pub use shop_service::{ShopError, ShopService, ShopServiceImpl};
pub use shoutbox_service::{ShoutboxError, ShoutboxService, ShoutboxServiceImpl};
pub use thread_service::{ThreadError, ThreadService, ThreadServiceImpl};
pub use wallet_service::{RainOutcome, WalletError, WalletService, WalletServiceImpl};
