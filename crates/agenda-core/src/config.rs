use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{
    DEFAULT_MAX_OCCURRENCES, DEFAULT_SLOT_STEP_MINUTES, DEFAULT_WORKING_HOURS,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub scheduling: SchedulingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    pub working_hours_start: u32,
    pub working_hours_end: u32,
    pub slot_step_minutes: i64,
    pub max_occurrences: u32,
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
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default(
                "scheduling.working_hours_start",
                i64::from(DEFAULT_WORKING_HOURS.0),
            )?
            .set_default(
                "scheduling.working_hours_end",
                i64::from(DEFAULT_WORKING_HOURS.1),
            )?
            .set_default("scheduling.slot_step_minutes", DEFAULT_SLOT_STEP_MINUTES)?
            .set_default("scheduling.max_occurrences", i64::from(DEFAULT_MAX_OCCURRENCES))?
            .set_default("logging.level", "debug")?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
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
