//! Startup configuration
//!
//! Settings are read once into a [`Config`] and passed explicitly to the
//! loader and renderer. Validation happens at construction time.

use chrono::Datelike;
use thiserror::Error;

/// Environment variable holding the dataset API access token
pub const API_KEY_VAR: &str = "MAPBOX_API_KEY";

/// Environment variable holding the `{owner}/{dataset_id}` to load
pub const DATASET_VAR: &str = "MAPBOX_SOURCE_DATASET";

/// First year in which purchases were recorded
pub const SALE_START_YEAR: i32 = 2015;

/// Marker diameter in rem
pub const MAP_ICON_SIZE: f64 = 3.0;

/// Errors raised while building a [`Config`]
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A required setting was absent or empty
    #[error("{message} (set {name})")]
    Missing { name: &'static str, message: &'static str },

    /// The year range is empty or reversed
    #[error("invalid year range: start year {start} is after current year {current}")]
    InvalidYearRange { start: i32, current: i32 },
}

impl ConfigError {
    /// Name of the offending setting, when there is one
    pub fn setting(&self) -> Option<&'static str> {
        match self {
            Self::Missing { name, .. } => Some(name),
            Self::InvalidYearRange { .. } => None,
        }
    }
}

/// Dataset API credentials
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    /// Token appended as `access_token` to every request
    pub api_key: String,
    /// Dataset identifier, `{owner}/{dataset_id}`
    pub dataset: String,
}

impl Credentials {
    /// Read both required settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both required settings through an arbitrary lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required(&lookup, API_KEY_VAR, "Missing Mapbox API key!")?;
        let dataset = required(&lookup, DATASET_VAR, "Missing source Mapbox dataset!")?;
        Ok(Self { api_key, dataset })
    }
}

fn required<F>(lookup: &F, name: &'static str, message: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing { name, message }),
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// API credentials; `None` when rendering from a local file
    pub credentials: Option<Credentials>,
    /// First legend year
    pub start_year: i32,
    /// Last legend year
    pub current_year: i32,
    /// Marker diameter in rem
    pub icon_size: f64,
}

impl Config {
    /// Build a configuration that fetches from the dataset API
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::offline()
            .with_credentials(Credentials::from_env()?)
            .validate()
    }

    /// Same as [`Config::from_env`] but with an injected lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::offline()
            .with_credentials(Credentials::from_lookup(lookup)?)
            .validate()
    }

    /// A configuration with no credentials, for rendering local data
    pub fn offline() -> Self {
        Self {
            credentials: None,
            start_year: SALE_START_YEAR,
            current_year: chrono::Local::now().year(),
            icon_size: MAP_ICON_SIZE,
        }
    }

    /// Attach API credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the legend start year
    pub fn with_start_year(mut self, year: i32) -> Self {
        self.start_year = year;
        self
    }

    /// Set the legend current year
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Set the marker size in rem
    pub fn with_icon_size(mut self, rem: f64) -> Self {
        self.icon_size = rem;
        self
    }

    /// Check cross-field invariants
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.start_year > self.current_year {
            return Err(ConfigError::InvalidYearRange {
                start: self.start_year,
                current: self.current_year,
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_credentials_present() {
        let creds = Credentials::from_lookup(lookup(&[
            (API_KEY_VAR, "pk.abc"),
            (DATASET_VAR, "someone/ck123"),
        ]))
        .unwrap();
        assert_eq!(creds.api_key, "pk.abc");
        assert_eq!(creds.dataset, "someone/ck123");
    }

    #[test]
    fn test_missing_api_key_names_setting() {
        let err = Credentials::from_lookup(lookup(&[(DATASET_VAR, "someone/ck123")])).unwrap_err();
        assert_eq!(err.setting(), Some(API_KEY_VAR));
        assert!(err.to_string().contains("MAPBOX_API_KEY"));
        assert!(err.to_string().contains("Missing Mapbox API key!"));
    }

    #[test]
    fn test_missing_dataset_names_setting() {
        let err = Config::from_lookup(lookup(&[(API_KEY_VAR, "pk.abc")])).unwrap_err();
        assert_eq!(err.setting(), Some(DATASET_VAR));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let err = Credentials::from_lookup(lookup(&[(API_KEY_VAR, ""), (DATASET_VAR, "x/y")]))
            .unwrap_err();
        assert_eq!(err.setting(), Some(API_KEY_VAR));
    }

    #[test]
    fn test_offline_defaults() {
        let config = Config::offline();
        assert!(config.credentials.is_none());
        assert_eq!(config.start_year, SALE_START_YEAR);
        assert!(config.current_year >= SALE_START_YEAR);
        assert_eq!(config.icon_size, MAP_ICON_SIZE);
    }

    #[test]
    fn test_from_lookup_is_validated() {
        let config = Config::from_lookup(lookup(&[
            (API_KEY_VAR, "pk.abc"),
            (DATASET_VAR, "someone/ck123"),
        ]))
        .unwrap();
        assert_eq!(config.clone().validate(), Ok(config.clone()));
        assert!(config.start_year <= config.current_year);
        assert_eq!(config.credentials.unwrap().dataset, "someone/ck123");
    }

    #[test]
    fn test_validate_rejects_reversed_range() {
        let err = Config::offline()
            .with_start_year(2020)
            .with_current_year(2019)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidYearRange {
                start: 2020,
                current: 2019
            }
        );
        assert_eq!(err.setting(), None);
    }
}
