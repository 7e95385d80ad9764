//! Runtime configuration.
//!
//! Loaded from YAML, with every key optional. Lookup order is an explicit
//! `--config` path, then `<config dir>/weather-feed/config.yaml`, then the
//! built-in defaults. `MISTRAL_API_KEY` fills in the report key.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const API_KEY_VAR: &str = "MISTRAL_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub location: Location,
    pub data_dir: PathBuf,
    /// Second directory tree read by the frontend.
    pub mirror_dir: Option<PathBuf>,
    pub rate_limit_delay_secs: u64,
    pub request_timeout_secs: u64,
    pub convert_wind_to_kmh: bool,
    /// Past days of Open-Meteo history to include in the forecast.
    pub past_days: Option<u32>,
    pub endpoints: Endpoints,
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            location: Location::default(),
            data_dir: PathBuf::from("data"),
            mirror_dir: None,
            rate_limit_delay_secs: 5,
            request_timeout_secs: 30,
            convert_wind_to_kmh: true,
            past_days: Some(2),
            endpoints: Endpoints::default(),
            report: ReportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Location {
            label: "Vienna Kledering".to_string(),
            latitude: 48.133029,
            longitude: 16.4277403,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub nowcast: String,
    pub forecast: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            nowcast: "https://dataset.api.hub.geosphere.at/v1/timeseries/forecast/nowcast-v1-15min-1km"
                .to_string(),
            forecast: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Upper bound on one completion request.
    pub timeout_secs: u64,
    pub analysis_file: String,
    pub weather_file: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            api_url: "https://api.mistral.ai/v1/chat/completions".to_string(),
            model: "mistral-small-latest".to_string(),
            api_key: None,
            timeout_secs: 120,
            analysis_file: "weather_analysis.json".to_string(),
            weather_file: "today_weather.json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Resolves the configuration file to use and applies the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_path().filter(|p| p.exists()) {
                Some(path) => {
                    log::debug!("Using configuration at {}", path.display());
                    Self::from_file(path)?
                }
                None => Self::default(),
            },
        };

        Ok(config.with_api_key(std::env::var(API_KEY_VAR).ok()))
    }

    /// Fills the report key from `key` unless the file already set one.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        if self.report.api_key.is_none() {
            self.report.api_key = key.filter(|k| !k.trim().is_empty());
        }
        self
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("weather-feed").join("config.yaml"))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

// -- Tests -------------------------------------------------------------------
