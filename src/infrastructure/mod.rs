//! Infrastructure Layer
//!
//! External concerns: PostgreSQL repositories, Redis caching, metrics.

pub mod cache;
pub mod database;
pub mod metrics;
pub mod repositories;
