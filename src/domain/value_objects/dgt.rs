//! DGT Amount Value Object
//!
//! DGT balances and transfers are denominated in integer "units" to avoid
//! floating point drift in the ledger. One DGT = 100 units.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Units per whole DGT token.
pub const UNITS_PER_DGT: i64 = 100;

/// An amount of DGT, in integer units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DgtAmount(i64);

impl DgtAmount {
    pub const ZERO: DgtAmount = DgtAmount(0);

    /// Create from raw units.
    pub fn from_units(units: i64) -> Self {
        Self(units)
    }

    /// Raw unit count.
    pub fn units(&self) -> i64 {
        self.0
    }

    /// Whole-token portion.
    pub fn whole(&self) -> i64 {
        self.0 / UNITS_PER_DGT
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Split evenly among `n` recipients.
    ///
    /// Returns the per-recipient share and the indivisible remainder.
    /// A zero recipient count yields a zero share with the full amount
    /// as remainder.
    pub fn split_even(&self, n: u32) -> (DgtAmount, DgtAmount) {
        if n == 0 {
            return (DgtAmount::ZERO, *self);
        }
        let share = self.0 / n as i64;
        let remainder = self.0 - share * n as i64;
        (DgtAmount(share), DgtAmount(remainder))
    }

    pub fn checked_sub(&self, other: DgtAmount) -> Option<DgtAmount> {
        self.0.checked_sub(other.0).map(DgtAmount)
    }

    pub fn saturating_add(&self, other: DgtAmount) -> DgtAmount {
        DgtAmount(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for DgtAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_DGT;
        let frac = (self.0 % UNITS_PER_DGT).abs();
        write!(f, "{}.{:02} DGT", whole, frac)
    }
}
