//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,
    /// Static bearer secret for the scheduled-notification endpoints.
    pub cron_secret: String,
    pub fcm_server_key: Option<String>,
    pub fcm_endpoint: String,
    pub ses_from_email: Option<String>,
    /// Base URL used in verification and reset links.
    pub app_base_url: String,
    /// Minutes offset from UTC for matching reminder times (default IST).
    pub reminder_offset_minutes: i32,
    pub session_ttl_days: i64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to ensure tests
    /// are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // --- Notification and Mail Settings ---
        let cron_secret = std::env::var("CRON_SECRET")
            .map_err(|_| ConfigError::MissingVar("CRON_SECRET".to_string()))?;

        let fcm_server_key = std::env::var("FCM_SERVER_KEY").ok();
        let fcm_endpoint = std::env::var("FCM_ENDPOINT")
            .unwrap_or_else(|_| "https://fcm.googleapis.com/fcm/send".to_string());

        let ses_from_email = std::env::var("SES_FROM_EMAIL").ok();

        let app_base_url = std::env::var("APP_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let reminder_offset_str =
            std::env::var("REMINDER_UTC_OFFSET_MINUTES").unwrap_or_else(|_| "330".to_string());
        let reminder_offset_minutes = reminder_offset_str.parse::<i32>().map_err(|e| {
            ConfigError::InvalidValue("REMINDER_UTC_OFFSET_MINUTES".to_string(), e.to_string())
        })?;

        let session_ttl_str =
            std::env::var("SESSION_TTL_DAYS").unwrap_or_else(|_| "30".to_string());
        let session_ttl_days = session_ttl_str.parse::<i64>().map_err(|e| {
            ConfigError::InvalidValue("SESSION_TTL_DAYS".to_string(), e.to_string())
        })?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            cron_secret,
            fcm_server_key,
            fcm_endpoint,
            ses_from_email,
            app_base_url,
            reminder_offset_minutes,
            session_ttl_days,
        })
    }
}
