//! Value Objects
//!
//! Immutable domain value types.

pub mod dgt;

pub use dgt::DgtAmount;
