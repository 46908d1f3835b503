//! Configuration Management
//!
//! Layered settings loading from files and environment variables.

pub mod settings;

pub use settings::{
    CorsSettings, DatabaseSettings, EconomySettings, JwtSettings, MultiplierSettings,
    RainSettings, RateLimitSettings, RedisSettings, ServerSettings, Settings,
    ShoutboxSettings, SnowflakeSettings,
};
