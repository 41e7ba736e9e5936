use std::time::Duration;

use anyhow::Result;
use chrono_tz::Tz;
use config::Config;
use serde::Deserialize;

use crate::constants::{
    DEFAULT_LINEAGE_LOOKBACK_DAYS, DEFAULT_STARTUP_DELAY_SECONDS, DEFAULT_SWEEP_INTERVAL_MINUTES,
    DEFAULT_TIMEZONE,
};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

/// Knobs for the recurring-schedule sweep.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// IANA name of the institution's civil timezone.
    pub timezone: String,
    pub sweep_interval_minutes: u32,
    pub startup_delay_seconds: u32,
    pub lineage_lookback_days: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_owned(),
            sweep_interval_minutes: DEFAULT_SWEEP_INTERVAL_MINUTES,
            startup_delay_seconds: DEFAULT_STARTUP_DELAY_SECONDS,
            lineage_lookback_days: DEFAULT_LINEAGE_LOOKBACK_DAYS,
        }
    }
}

impl ScheduleConfig {
    /// ## Summary
    /// Resolves the configured timezone name.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidConfiguration` if the name is not a known IANA zone.
    pub fn tz(&self) -> CoreResult<Tz> {
        self.timezone.parse::<Tz>().map_err(|_err| {
            CoreError::InvalidConfiguration(format!("unknown timezone: {}", self.timezone))
        })
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.sweep_interval_minutes.max(1)) * 60)
    }

    #[must_use]
    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.startup_delay_seconds))
    }

    #[must_use]
    pub fn lineage_lookback(&self) -> chrono::Days {
        chrono::Days::new(u64::from(self.lineage_lookback_days))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails,
    /// or if the configured timezone cannot be resolved.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("database.max_connections", 4)?
            .set_default("schedule.timezone", DEFAULT_TIMEZONE)?
            .set_default("schedule.sweep_interval_minutes", DEFAULT_SWEEP_INTERVAL_MINUTES)?
            .set_default("schedule.startup_delay_seconds", DEFAULT_STARTUP_DELAY_SECONDS)?
            .set_default("schedule.lineage_lookback_days", DEFAULT_LINEAGE_LOOKBACK_DAYS)?
            .set_default("logging.level", "info")?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        let tz = settings.schedule.tz()?;
        tracing::debug!(
            timezone = %tz,
            sweep_interval_minutes = settings.schedule.sweep_interval_minutes,
            "Settings loaded"
        );

        Ok(settings)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
