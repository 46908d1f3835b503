//! XP Leveling Curve
//!
//! Maps lifetime XP to levels. The curve is a strictly increasing
//! polynomial so the inverse is well defined:
//!
//! ```text
//! xp_for_level(n) = 25n^2 + 75n
//! ```
//!
//! Level 0 starts at 0 XP, level 1 at 100, level 2 at 250, level 10 at
//! 3250, and so on.

use serde::Serialize;

/// Total XP required to reach `level`.
pub fn xp_for_level(level: i32) -> i64 {
    let l = level.max(0) as i64;
    25 * l * l + 75 * l
}

/// The level a user with `xp` lifetime XP has reached.
pub fn level_for_xp(xp: i64) -> i32 {
    if xp <= 0 {
        return 0;
    }
    // Invert 25l^2 + 75l <= xp via the quadratic formula, then correct
    // for float error at the boundary.
    let approx = ((-75.0 + (5625.0 + 100.0 * xp as f64).sqrt()) / 50.0).floor() as i32;
    let mut level = approx.max(0);
    while xp_for_level(level + 1) <= xp {
        level += 1;
    }
    while level > 0 && xp_for_level(level) > xp {
        level -= 1;
    }
    level
}

/// A user's progress toward the next level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProgress {
    pub level: i32,
    /// XP accumulated past the current level threshold
    pub xp_into_level: i64,
    /// XP needed to go from the current level to the next
    pub xp_for_next: i64,
    /// Fraction of the way to the next level, in [0, 1)
    pub progress: f64,
}

/// Compute level progress for a lifetime XP total.
pub fn progress_for_xp(xp: i64) -> LevelProgress {
    let xp = xp.max(0);
    let level = level_for_xp(xp);
    let current_threshold = xp_for_level(level);
    let next_threshold = xp_for_level(level + 1);
    let xp_into_level = xp - current_threshold;
    let xp_for_next = next_threshold - current_threshold;

    LevelProgress {
        level,
        xp_into_level,
        xp_for_next,
        progress: xp_into_level as f64 / xp_for_next as f64,
    }
}
