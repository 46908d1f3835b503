//! XP Multiplier Sanitizer
//!
//! Combines a role-based multiplier and a forum-based multiplier under a
//! configurable stacking rule, then enforces per-source and total caps.
//!
//! Enforcement modes:
//! - `strict`: the capped value is returned
//! - `warn`: the uncapped value is returned, violations logged at warn level
//! - `log_only`: the uncapped value is returned, violations logged at info
//!
//! Invariants:
//! - the final multiplier is never below 1.0
//! - in strict mode the final multiplier never exceeds `max_total`

use serde::{Deserialize, Serialize};

/// The multiplier floor. Sources below this are raised to it before combining.
pub const MULTIPLIER_FLOOR: f64 = 1.0;

/// How role and forum multipliers combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StackingRule {
    /// 1.0 + (role - 1.0) + (forum - 1.0)
    Additive,
    /// role * forum
    #[default]
    Multiplicative,
    /// max(role, forum)
    BestOf,
    /// role_weight * role + forum_weight * forum (weights normalized)
    WeightedAverage,
}

impl StackingRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Additive => "additive",
            Self::Multiplicative => "multiplicative",
            Self::BestOf => "best_of",
            Self::WeightedAverage => "weighted_average",
        }
    }
}

/// What happens when a cap is exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementMode {
    /// Return the capped value
    #[default]
    Strict,
    /// Return the uncapped value, log violations at warn level
    Warn,
    /// Return the uncapped value, log violations at info level
    LogOnly,
}

impl EnforcementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Warn => "warn",
            Self::LogOnly => "log_only",
        }
    }
}

/// Stacking and cap policy, typically built from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiplierPolicy {
    pub stacking: StackingRule,
    pub enforcement: EnforcementMode,
    pub max_per_source: f64,
    pub max_total: f64,
    pub role_weight: f64,
    pub forum_weight: f64,
}

impl Default for MultiplierPolicy {
    fn default() -> Self {
        Self {
            stacking: StackingRule::Multiplicative,
            enforcement: EnforcementMode::Strict,
            max_per_source: 3.0,
            max_total: 5.0,
            role_weight: 0.5,
            forum_weight: 0.5,
        }
    }
}

/// Result of sanitizing a role/forum multiplier pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiplierOutcome {
    /// The multiplier callers should apply
    pub final_multiplier: f64,
    /// The combined value before any capping
    pub raw_multiplier: f64,
    /// Whether capping changed the returned value
    pub capped: bool,
    /// Human-readable cap violations, empty when everything was in range
    pub violations: Vec<String>,
}

impl MultiplierOutcome {
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}

/// Combine two multiplier sources under the policy's stacking rule.
fn combine(role: f64, forum: f64, policy: &MultiplierPolicy) -> f64 {
    match policy.stacking {
        StackingRule::Additive => {
            MULTIPLIER_FLOOR + (role - MULTIPLIER_FLOOR) + (forum - MULTIPLIER_FLOOR)
        }
        StackingRule::Multiplicative => role * forum,
        StackingRule::BestOf => role.max(forum),
        StackingRule::WeightedAverage => {
            let total = policy.role_weight + policy.forum_weight;
            if total <= 0.0 {
                // Degenerate weights fall back to an even average
                (role + forum) / 2.0
            } else {
                (policy.role_weight * role + policy.forum_weight * forum) / total
            }
        }
    }
}

/// Sanitize a role/forum multiplier pair.
///
/// Both inputs are floored at 1.0 before combining. Per-source caps are
/// checked against the floored inputs; the total cap is checked against the
/// combined value of the per-source-capped inputs. In strict mode the capped
/// result is returned; in warn/log_only modes the uncapped result is
/// returned but every violation is still recorded for observability.
pub fn sanitize_multipliers(
    role_multiplier: f64,
    forum_multiplier: f64,
    policy: &MultiplierPolicy,
) -> MultiplierOutcome {
    let mut violations = Vec::new();

    let role = floor_source(role_multiplier, "role", &mut violations);
    let forum = floor_source(forum_multiplier, "forum", &mut violations);

    // Per-source cap checks
    if role > policy.max_per_source {
        violations.push(format!(
            "role multiplier {:.2} exceeds per-source cap {:.2}",
            role, policy.max_per_source
        ));
    }
    if forum > policy.max_per_source {
        violations.push(format!(
            "forum multiplier {:.2} exceeds per-source cap {:.2}",
            forum, policy.max_per_source
        ));
    }

    let raw = combine(role, forum, policy);

    // Capped path: clamp each source, combine, clamp the total
    let role_capped = role.min(policy.max_per_source);
    let forum_capped = forum.min(policy.max_per_source);
    let mut total_capped = combine(role_capped, forum_capped, policy);

    if total_capped > policy.max_total {
        violations.push(format!(
            "combined multiplier {:.2} ({}) exceeds total cap {:.2}",
            total_capped,
            policy.stacking.as_str(),
            policy.max_total
        ));
        total_capped = policy.max_total;
    }
    total_capped = total_capped.max(MULTIPLIER_FLOOR);

    let final_multiplier = match policy.enforcement {
        EnforcementMode::Strict => total_capped,
        EnforcementMode::Warn | EnforcementMode::LogOnly => raw.max(MULTIPLIER_FLOOR),
    };

    let capped = matches!(policy.enforcement, EnforcementMode::Strict)
        && (raw - final_multiplier).abs() > f64::EPSILON;

    if !violations.is_empty() {
        match policy.enforcement {
            EnforcementMode::Strict | EnforcementMode::Warn => {
                tracing::warn!(
                    role = role_multiplier,
                    forum = forum_multiplier,
                    raw,
                    final_multiplier,
                    violations = ?violations,
                    "XP multiplier cap violation"
                );
            }
            EnforcementMode::LogOnly => {
                tracing::info!(
                    role = role_multiplier,
                    forum = forum_multiplier,
                    raw,
                    final_multiplier,
                    violations = ?violations,
                    "XP multiplier cap violation (log only)"
                );
            }
        }
    }

    MultiplierOutcome {
        final_multiplier,
        raw_multiplier: raw,
        capped,
        violations,
    }
}

/// Raise a source to the floor, recording a violation when it was below it.
fn floor_source(value: f64, source: &str, violations: &mut Vec<String>) -> f64 {
    if value < MULTIPLIER_FLOOR {
        violations.push(format!(
            "{} multiplier {:.2} below floor {:.2}, raised",
            source, value, MULTIPLIER_FLOOR
        ));
        MULTIPLIER_FLOOR
    } else {
        value
    }
}
