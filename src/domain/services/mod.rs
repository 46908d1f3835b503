//! Domain Services
//!
//! Pure, synchronous domain logic with no I/O beyond logging.

pub mod leveling;
pub mod multiplier;
pub mod structure;

pub use leveling::{level_for_xp, xp_for_level, LevelProgress};
pub use multiplier::{
    sanitize_multipliers, EnforcementMode, MultiplierOutcome, MultiplierPolicy, StackingRule,
};
pub use structure::{build_structure, StructureNode};
