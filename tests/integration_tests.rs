//! Integration Tests Entry Point
//!
//! Service-level tests wired against in-memory repository fakes:
//! - `services/` - use-case flows (auth, economy, threads, wallet, shop)
//! - `common/` - shared fakes and fixture builders

mod common;
mod services;
