use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use spark_core::projection::View;

use crate::timezone::detect_system_timezone;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    /// IANA timezone "today" is computed in. Detected when unset.
    pub timezone: Option<String>,
    pub default_view: View,
    /// Filters joined with `and` when `list` is run without a query.
    pub default_filters: Vec<String>,
    pub log_level: String,
    /// Pins "today" to a fixed date instead of reading the clock.
    pub today: Option<NaiveDate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("spark.db"),
            timezone: None,
            default_view: View::Today,
            default_filters: Vec::new(),
            log_level: "warn".to_string(),
            today: None,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("config.toml"))
                .merge(Env::prefixed("SPARK_")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }

    pub fn timezone(&self) -> String {
        self.timezone
            .clone()
            .unwrap_or_else(detect_system_timezone)
    }

    /// The current date in the configured timezone, unless pinned.
    pub fn today(&self) -> Result<NaiveDate, spark_core::error::CoreError> {
        match self.today {
            Some(today) => Ok(today),
            None => spark_core::timezone::today_in(&self.timezone(), Utc::now()),
        }
    }
}
