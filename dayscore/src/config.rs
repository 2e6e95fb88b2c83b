//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `DAYSCORE_CONFIG`
//! environment variable. A missing file is not an error: every field has a default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `DAYSCORE_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `DAYSCORE_AUTH__MODE=token` sets the `auth.mode` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use dayscore::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}", config.bind_address());
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port`
//! - **Database**: `database.url`, `database.pool` - SQLite connection settings
//! - **Security**: `secret_key` - HS256 signing key, required in token mode
//! - **Authentication**: `auth.mode` selects the `session` (cookie + HTML pages) or `token`
//!   (bearer JWT + JSON API) variant; `auth.password`, `auth.session`, `auth.token`,
//!   `auth.security.cors` tune each piece
//! - **Scores**: `scores.*_window_days` - default look-back windows
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! DAYSCORE_PORT=8080
//! DATABASE_URL="sqlite://dayscore.db"
//! DAYSCORE_AUTH__MODE=token
//! DAYSCORE_SECRET_KEY=change-me
//! DAYSCORE_AUTH__TOKEN__EXPIRY=12h
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::auth::password::Argon2Params;
use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "DAYSCORE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults defined in the `Default` implementation, so an empty file (or no
/// file at all) yields a runnable session-mode server on port 3000.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Set from the raw `DATABASE_URL` variable and folded into `database.url` on load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// SQLite database settings
    pub database: DatabaseConfig,
    /// Secret key for JWT signing (required in token mode)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Score query defaults
    pub scores: ScoresConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite connection string. The file is created if it does not exist.
    pub url: String,
    pub pool: PoolSettings,
}

/// Connection pool parameters passed to `SqlitePoolOptions`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
    /// Maximum lifetime of a connection (seconds, 0 = never)
    pub max_lifetime_secs: u64,
}

/// Which authentication variant the server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Session cookie, server-rendered pages, form-encoded bodies
    #[default]
    Session,
    /// Bearer JWT, JSON API under `/api`, embedded static front-end
    Token,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// Password validation and hashing rules
    pub password: PasswordConfig,
    /// Session cookie configuration (session mode)
    pub session: SessionConfig,
    /// Bearer token configuration (token mode)
    pub token: TokenConfig,
    /// Security settings (CORS)
    pub security: SecurityConfig,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Session lifetime
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Cookie name for the session value
    pub cookie_name: String,
    /// Set Secure flag on cookies (HTTPS only)
    pub cookie_secure: bool,
    /// SameSite cookie attribute ("strict", "lax", or "none")
    pub cookie_same_site: String,
}

/// Bearer token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenConfig {
    /// Lifetime of issued tokens (`exp - iat`)
    #[serde(with = "humantime_serde")]
    pub expiry: Duration,
}

/// Password validation rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl PasswordConfig {
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

/// Security configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `http://localhost:5173`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

/// Upper bound for `scores.dashboard_window_days`; the dashboard renders one cell per day.
pub const MAX_DASHBOARD_WINDOW_DAYS: i64 = 3660;

/// Default look-back windows for score queries, in days.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoresConfig {
    /// `GET /get_scores` without `days` in session mode
    pub session_window_days: i64,
    /// `GET /api/get_scores` without `days` in token mode
    pub api_window_days: i64,
    /// Range rendered on the session-mode dashboard
    pub dashboard_window_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            database: DatabaseConfig::default(),
            secret_key: None,
            auth: AuthConfig::default(),
            scores: ScoresConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://dayscore.db".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,  // 10 minutes
            max_lifetime_secs: 1800, // 30 minutes
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(24 * 60 * 60), // 24 hours
            cookie_name: "dayscore_session".to_string(),
            cookie_secure: true,
            cookie_same_site: "lax".to_string(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            expiry: Duration::from_secs(24 * 60 * 60), // 1 day
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: 64,
            // Argon2id RFC recommendations
            argon2_memory_kib: 19456, // 19 MB
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Url(Url::parse("http://localhost:5173").expect("static URL is valid"))],
            allow_credentials: true,
            max_age: Some(3600), // Cache preflight for 1 hour
        }
    }
}

impl Default for ScoresConfig {
    fn default() -> Self {
        Self {
            session_window_days: 30,
            api_window_days: 365,
            dashboard_window_days: 365,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.auth.mode == AuthMode::Token && self.secret_key.as_deref().is_none_or(str::is_empty) {
            return Err(Error::Internal {
                operation: "Config validation: token authentication is enabled but secret_key is not configured. \
                 Please set DAYSCORE_SECRET_KEY environment variable or add secret_key to config file."
                    .to_string(),
            });
        }

        let password = &self.auth.password;
        if password.min_length > password.max_length {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: Invalid password configuration: min_length ({}) cannot be greater than max_length ({})",
                    password.min_length, password.max_length
                ),
            });
        }

        let windows = [
            ("session_window_days", self.scores.session_window_days),
            ("api_window_days", self.scores.api_window_days),
            ("dashboard_window_days", self.scores.dashboard_window_days),
        ];
        for (name, days) in windows {
            if days < 0 {
                return Err(Error::Internal {
                    operation: format!("Config validation: scores.{name} ({days}) cannot be negative"),
                });
            }
        }

        if self.scores.dashboard_window_days > MAX_DASHBOARD_WINDOW_DAYS {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: scores.dashboard_window_days ({}) cannot exceed {MAX_DASHBOARD_WINDOW_DAYS}",
                    self.scores.dashboard_window_days
                ),
            });
        }

        if self.database.pool.max_connections == 0 {
            return Err(Error::Internal {
                operation: "Config validation: database.pool.max_connections must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("DAYSCORE_").ignore(&["CONFIG"]).split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Look-back window used by `get_scores` when the request omits `days`.
    pub fn default_window_days(&self) -> i64 {
        match self.auth.mode {
            AuthMode::Session => self.scores.session_window_days,
            AuthMode::Token => self.scores.api_window_days,
        }
    }
}
