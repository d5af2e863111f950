use anyhow::Result;
use chrono::Weekday;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub calendar: CalendarConfig,
    pub feed: FeedConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// Weekday the month grid starts on, lowercase English name.
    pub first_weekday: String,
    /// How many years ahead a special day is materialized.
    pub horizon_years: u32,
}

impl CalendarConfig {
    /// ## Summary
    /// Resolves the configured first weekday into a `chrono::Weekday`.
    ///
    /// ## Errors
    /// Returns an error if the configured name is not a weekday.
    pub fn first_weekday(&self) -> CoreResult<Weekday> {
        match self.first_weekday.to_ascii_lowercase().as_str() {
            "monday" => Ok(Weekday::Mon),
            "tuesday" => Ok(Weekday::Tue),
            "wednesday" => Ok(Weekday::Wed),
            "thursday" => Ok(Weekday::Thu),
            "friday" => Ok(Weekday::Fri),
            "saturday" => Ok(Weekday::Sat),
            "sunday" => Ok(Weekday::Sun),
            other => Err(CoreError::InvalidConfiguration(format!(
                "unknown weekday name: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Icon reference used in month grids for events without one.
    pub default_icon: String,
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
            .set_default("calendar.first_weekday", "sunday")?
            .set_default("calendar.horizon_years", 10)?
            .set_default("feed.default_icon", "star")?
            .set_default("logging.level", "info")?
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
