//! Repository Implementations
//!
//! PostgreSQL implementations of the domain repository traits.

mod forum_repository;
mod mod_action_repository;
mod post_repository;
mod session_repository;
mod shop_repository;
mod shout_repository;
mod thread_repository;
mod title_repository;
mod user_repository;
mod wallet_repository;

pub use forum_repository::PgForumNodeRepository;
pub use mod_action_repository::PgModActionRepository;
pub use post_repository::PgPostRepository;
pub use session_repository::PgSessionRepository;
pub use shop_repository::PgShopItemRepository;
pub use shout_repository::PgShoutRepository;
pub use thread_repository::PgThreadRepository;
pub use title_repository::PgCosmeticRepository;
pub use user_repository::PgUserRepository;
pub use wallet_repository::PgWalletRepository;
