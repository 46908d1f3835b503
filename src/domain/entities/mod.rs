//! Domain Entities
//!
//! Core entities and their repository traits. Each entity maps to a table
//! in the relational schema; repository traits are implemented in the
//! infrastructure layer.

pub mod forum;
pub mod moderation;
pub mod post;
pub mod session;
pub mod shop;
pub mod shout;
pub mod thread;
pub mod title;
pub mod transaction;
pub mod user;

pub use forum::{ForumNode, ForumNodeRepository, NodeKind};
pub use moderation::{ModAction, ModActionKind, ModActionRepository};
pub use post::{Post, PostRepository};
pub use session::{Session, SessionRepository};
pub use shop::{ShopItem, ShopItemKind, ShopItemRepository};
pub use shout::{Shout, ShoutKind, ShoutRepository};
pub use thread::{Thread, ThreadRepository};
pub use title::{Badge, CosmeticRepository, Title};
pub use transaction::{RainShare, TransactionKind, WalletRepository, WalletTransaction};
pub use user::{User, UserRepository, UserRole};
