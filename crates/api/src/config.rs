//! # API Configuration Module
//!
//! Loads the server configuration from environment variables, with defaults
//! where a value is optional.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: address to bind to (default: "0.0.0.0")
//! - `API_PORT`: port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: per-request timeout (default: 30)
//! - `AGENDA_TIMEZONE`: IANA zone all dates and times are read in (default: "America/Sao_Paulo")
//! - `RESCHEDULE_TOKEN_TTL_DAYS`: lifetime of a reschedule link (default: 14)
//! - `RESCHEDULE_WINDOW_DAYS`: move targets run from tomorrow through tomorrow plus this many days (default: 14)

use agenda_core::services::RescheduleSettings;
use chrono_tz::Tz;
use eyre::{Result, WrapErr, eyre};
use std::env;
use tracing::Level;

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Configuration for the agenda API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use agenda_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}", config.server_addr());
///     Ok(())
/// }
/// ```
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

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Civil timezone of the agenda
    pub timezone: Tz,

    pub reschedule: RescheduleSettings,
}

pub fn parse_log_level(raw: &str) -> Level {
    match raw {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

pub fn parse_timezone(raw: &str) -> Result<Tz> {
    raw.parse::<Tz>()
        .map_err(|err| eyre!("Invalid AGENDA_TIMEZONE value '{}': {}", raw, err))
}

fn positive_days(name: &str, default: i64) -> Result<i64> {
    let days: i64 = match env::var(name) {
        Ok(raw) => raw.parse().wrap_err_with(|| format!("Invalid {name} value"))?,
        Err(_) => default,
    };
    if days <= 0 {
        return Err(eyre!("{} must be a positive number of days", name));
    }
    Ok(days)
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// - `DATABASE_URL` is not set
    /// - `API_PORT` is not a valid u16
    /// - `AGENDA_TIMEZONE` is not a known IANA zone
    /// - a reschedule setting is not a positive integer
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

        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Agenda settings
        let timezone = parse_timezone(
            &env::var("AGENDA_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string()),
        )?;
        let defaults = RescheduleSettings::default();
        let reschedule = RescheduleSettings {
            token_ttl_days: positive_days("RESCHEDULE_TOKEN_TTL_DAYS", defaults.token_ttl_days)?,
            window_days: positive_days("RESCHEDULE_WINDOW_DAYS", defaults.window_days)?,
        };

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            timezone,
            reschedule,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
