//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::services::multiplier::{EnforcementMode, MultiplierPolicy, StackingRule};
use crate::domain::UserRole;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Redis configuration
    pub redis: RedisSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// Snowflake ID generator settings
    pub snowflake: SnowflakeSettings,

    /// Rate limiting configuration
    pub rate_limit: RateLimitSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// XP economy configuration
    pub economy: EconomySettings,

    /// Rain broadcast configuration
    pub rain: RainSettings,

    /// Shoutbox configuration
    pub shoutbox: ShoutboxSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis connection URL
    pub url: String,

    /// Connection pool size
    pub pool_size: u32,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,

    /// Refresh token expiry in days
    pub refresh_token_expiry_days: i64,
}

/// Snowflake ID generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeSettings {
    /// Machine/worker ID (0-1023)
    pub machine_id: u16,

    /// Custom epoch timestamp in milliseconds
    pub epoch: u64,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Maximum requests per second
    pub requests_per_second: f64,

    /// Burst size (bucket capacity)
    pub burst_size: u32,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// XP economy configuration.
///
/// Base awards are scaled by the sanitized role x forum multiplier; the
/// multiplier policy controls stacking, caps, and enforcement.
#[derive(Debug, Clone, Deserialize)]
pub struct EconomySettings {
    /// XP awarded for creating a thread
    pub thread_xp: i64,

    /// XP awarded for creating a post
    pub post_xp: i64,

    /// XP awarded for posting a shout
    pub shout_xp: i64,

    /// Role-based multipliers
    pub role_multiplier_user: f64,
    pub role_multiplier_moderator: f64,
    pub role_multiplier_admin: f64,

    /// Multiplier stacking policy
    pub multiplier: MultiplierSettings,
}

impl EconomySettings {
    /// Multiplier applied for a user's role.
    pub fn role_multiplier(&self, role: UserRole) -> f64 {
        match role {
            UserRole::User => self.role_multiplier_user,
            UserRole::Moderator => self.role_multiplier_moderator,
            UserRole::Admin => self.role_multiplier_admin,
        }
    }

    /// Build the domain-layer multiplier policy from configuration.
    pub fn policy(&self) -> MultiplierPolicy {
        MultiplierPolicy {
            stacking: self.multiplier.stacking,
            enforcement: self.multiplier.enforcement,
            max_per_source: self.multiplier.max_per_source,
            max_total: self.multiplier.max_total,
            role_weight: self.multiplier.role_weight,
            forum_weight: self.multiplier.forum_weight,
        }
    }
}

/// Multiplier stacking and cap configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MultiplierSettings {
    /// How role and forum multipliers combine
    pub stacking: StackingRule,

    /// What happens when caps are exceeded
    pub enforcement: EnforcementMode,

    /// Cap applied to each individual source
    pub max_per_source: f64,

    /// Cap applied to the combined multiplier
    pub max_total: f64,

    /// Weight of the role multiplier under weighted_average stacking
    pub role_weight: f64,

    /// Weight of the forum multiplier under weighted_average stacking
    pub forum_weight: f64,
}

/// Rain broadcast configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RainSettings {
    /// Minimum amount (DGT units) a rain must carry
    pub min_amount_units: i64,

    /// Maximum number of recipients per rain
    pub max_recipients: u32,

    /// How long after their last shout a user stays rain-eligible (seconds)
    pub presence_ttl_secs: u64,
}

/// Shoutbox configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ShoutboxSettings {
    /// Maximum shout length in characters
    pub max_content_length: usize,

    /// Default page size for the message feed
    pub default_page_size: i32,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("redis.pool_size", 10)?
            .set_default("jwt.access_token_expiry_minutes", 15)?
            .set_default("jwt.refresh_token_expiry_days", 7)?
            .set_default("snowflake.machine_id", 1)?
            .set_default("snowflake.epoch", 1672531200000_u64)?
            .set_default("rate_limit.requests_per_second", 10.0)?
            .set_default("rate_limit.burst_size", 30)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            // Economy defaults
            .set_default("economy.thread_xp", 50)?
            .set_default("economy.post_xp", 25)?
            .set_default("economy.shout_xp", 2)?
            .set_default("economy.role_multiplier_user", 1.0)?
            .set_default("economy.role_multiplier_moderator", 1.25)?
            .set_default("economy.role_multiplier_admin", 1.5)?
            .set_default("economy.multiplier.stacking", "multiplicative")?
            .set_default("economy.multiplier.enforcement", "strict")?
            .set_default("economy.multiplier.max_per_source", 3.0)?
            .set_default("economy.multiplier.max_total", 5.0)?
            .set_default("economy.multiplier.role_weight", 0.5)?
            .set_default("economy.multiplier.forum_weight", 0.5)?
            // Rain defaults
            .set_default("rain.min_amount_units", 100)?
            .set_default("rain.max_recipients", 25)?
            .set_default("rain.presence_ttl_secs", 300)?
            // Shoutbox defaults (clients poll every 5s)
            .set_default("shoutbox.max_content_length", 500)?
            .set_default("shoutbox.default_page_size", 50)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option(
                "snowflake.machine_id",
                std::env::var("SNOWFLAKE_MACHINE_ID").ok(),
            )?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                // Validate JWT secret length for security
                if settings.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
                    return Err(ConfigError::Message(format!(
                        "JWT secret must be at least {} characters for security. Current length: {}",
                        MIN_JWT_SECRET_LENGTH,
                        settings.jwt.secret.len()
                    )));
                }
                Ok(settings)
            })
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerSettings {
    /// Get the socket address for binding.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid server address configuration")
    }
}

impl DatabaseSettings {
    /// Get the connection URL.
    pub fn connection_url(&self) -> &str {
        &self.url
    }
}
