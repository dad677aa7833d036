use std::env;

use agenda_core::services::RescheduleSettings;
use chrono_tz::Tz;
use eyre::{Result, WrapErr, eyre};
use tracing::Level;
use uuid::Uuid;

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Where reminders go and how their links are built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderConfig {
    /// Collaborator endpoint receiving one POST per reminder
    pub webhook_url: Option<String>,
    /// Public base URL of the client-facing app, used for reschedule links
    pub public_url: Option<String>,
}

impl SenderConfig {
    pub fn from_env() -> Self {
        Self {
            webhook_url: non_empty_var("REMINDER_WEBHOOK_URL"),
            public_url: non_empty_var("APP_PUBLIC_URL"),
        }
    }
}

/// Configuration for one reminder sweep.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// Database connection URL (required)
    pub database_url: String,
    pub log_level: Level,
    /// Civil timezone "today" is read in
    pub timezone: Tz,
    /// Limits the sweep to one professional when set
    pub professional_id: Option<Uuid>,
    pub sender: SenderConfig,
    pub reschedule: RescheduleSettings,
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn positive_days(name: &str, default: i64) -> Result<i64> {
    let days = match non_empty_var(name) {
        Some(raw) => raw
            .parse::<i64>()
            .wrap_err_with(|| format!("{name} must be a whole number of days"))?,
        None => default,
    };
    if days <= 0 {
        return Err(eyre!("{} must be positive", name));
    }
    Ok(days)
}

impl ReminderConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| eyre!("DATABASE_URL environment variable not set"))?;

        let log_level = match non_empty_var("LOG_LEVEL").as_deref() {
            Some("trace") => Level::TRACE,
            Some("debug") => Level::DEBUG,
            Some("warn") => Level::WARN,
            Some("error") => Level::ERROR,
            _ => Level::INFO,
        };

        let zone = non_empty_var("AGENDA_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = zone
            .parse::<Tz>()
            .map_err(|err| eyre!("AGENDA_TIMEZONE '{}' is not a known timezone: {}", zone, err))?;

        let professional_id = non_empty_var("REMINDER_PROFESSIONAL_ID")
            .map(|raw| raw.parse::<Uuid>())
            .transpose()
            .wrap_err("REMINDER_PROFESSIONAL_ID must be a UUID")?;

        let defaults = RescheduleSettings::default();
        let reschedule = RescheduleSettings {
            token_ttl_days: positive_days("RESCHEDULE_TOKEN_TTL_DAYS", defaults.token_ttl_days)?,
            window_days: positive_days("RESCHEDULE_WINDOW_DAYS", defaults.window_days)?,
        };

        Ok(Self {
            database_url,
            log_level,
            timezone,
            professional_id,
            sender: SenderConfig::from_env(),
            reschedule,
        })
    }
}
