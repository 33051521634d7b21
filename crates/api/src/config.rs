//! # API Configuration Module
//!
//! Loads the server configuration from environment variables, with defaults
//! where a missing value has a sensible one.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `JWT_SECRET`: Secret for signing login tokens (random per process if unset)
//! - `TOKEN_TTL_HOURS`: Lifetime of a login token (default: 12)
//! - `CLINIC_TIMEZONE`: IANA zone appointment times are read in (default: "UTC")
//!
//! Mail settings are read separately by [`medsync_notify::config::NotifyConfig`].

use chrono_tz::Tz;
use eyre::{eyre, Result, WrapErr};
use medsync_notify::config::NotifyConfig;
use std::env;
use tracing::Level;

/// Configuration for the MedSync API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// JWT signing secret (optional)
    pub jwt_secret: Option<String>,

    /// Lifetime of issued login tokens, in hours
    pub token_ttl_hours: i64,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Zone in which booked dates and times are interpreted
    pub clinic_timezone: Tz,

    /// Outbound mail settings
    pub notify: NotifyConfig,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - API_PORT or TOKEN_TTL_HOURS cannot be parsed
    /// - CLINIC_TIMEZONE is not a known IANA zone
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        // Security settings
        let jwt_secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "12".to_string())
            .parse()
            .wrap_err("Invalid TOKEN_TTL_HOURS value")?;

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Scheduling settings
        let clinic_timezone =
            parse_timezone(&env::var("CLINIC_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()))?;

        let notify = NotifyConfig::from_env()?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            jwt_secret,
            token_ttl_hours,
            request_timeout,
            clinic_timezone,
            notify,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_log_level(raw: &str) -> Level {
    match raw {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn parse_timezone(raw: &str) -> Result<Tz> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|e| eyre!("Invalid CLINIC_TIMEZONE value '{}': {}", raw, e))
}
