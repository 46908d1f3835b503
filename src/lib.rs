//! # Degentalk Server Library
//!
//! This crate provides the backend for Degentalk, a gamified crypto-culture
//! forum with:
//! - Threaded forum discussions (zones, forums, subforums)
//! - A shoutbox chat feed polled by clients
//! - An XP/leveling economy with configurable multiplier stacking
//! - An internal DGT token ledger (tipping, rain, shop purchases)
//! - Roles, titles and badges
//! - A moderation/admin back office
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, repository traits, and pure economy logic
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: PostgreSQL, Redis, and metrics implementations
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! degentalk/
//! +-- config/        Configuration management (incl. economy policy)
//! +-- domain/        Entities, value objects, and pure domain services
//! +-- application/   Application services and DTOs
//! +-- infrastructure/ Database, cache, and metrics implementations
//! +-- presentation/  HTTP routes, handlers, and middleware
//! +-- shared/        Common utilities (errors, snowflake IDs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
