//! Application configuration
//!
//! Values come from an optional TOML file (by default
//! `<config dir>/nebokrug/config.toml`) overlaid with `NEBOKRUG__SECTION__KEY`
//! environment variables. Everything has a default, so an empty file or no
//! file at all is a working setup.

use crate::NeboKrugError;
use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// First year covered by the Open-Meteo archive
pub const ARCHIVE_FIRST_YEAR: i32 = 1940;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub weather: WeatherConfig,
    pub history: HistoryConfig,
    pub ai: AiConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Open-Meteo endpoints and HTTP behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub forecast_base_url: String,
    pub archive_base_url: String,
    pub geocoding_base_url: String,
    /// Per-request timeout, seconds
    pub timeout_seconds: u32,
    /// Retries for transient failures (5xx, timeouts)
    pub max_retries: u32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_base_url: "https://api.open-meteo.com/v1".into(),
            archive_base_url: "https://archive-api.open-meteo.com/v1".into(),
            geocoding_base_url: "https://geocoding-api.open-meteo.com/v1".into(),
            timeout_seconds: 30,
            max_retries: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Oldest year in the comparison
    pub start_year: i32,
    /// Archive requests in flight at once
    pub concurrency: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            start_year: 1945,
            concurrency: 6,
        }
    }
}

/// Both halves of the recommendation feature read this section: the CLI uses
/// `service_url`, the companion server uses the model fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub service_url: String,
    pub timeout_seconds: u32,
    pub model: String,
    pub api_base_url: String,
    /// Falls back to `GOOGLE_API_KEY` when unset
    pub api_key: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8080".into(),
            timeout_seconds: 60,
            model: "gemini-1.5-flash".into(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key: None,
        }
    }
}

/// On-disk cache for archive responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Directory override, otherwise `<cache dir>/nebokrug`
    pub location: Option<String>,
    pub ttl_hours: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            location: None,
            ttl_hours: 24 * 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(NeboKrugError::config(message()).into())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl AppConfig {
    /// Reads the config file at `path`, or the default location when `None`.
    /// A missing file is not an error.
    pub fn load_from_path(path: Option<PathBuf>) -> Result<Self> {
        let file = path
            .or_else(Self::default_path)
            .unwrap_or_else(|| PathBuf::from("config.toml"));

        let mut config: AppConfig = Self::sources(&file)
            .build()
            .with_context(|| format!("Failed to read configuration from {}", file.display()))?
            .try_deserialize()
            .context("Configuration has an unexpected shape")?;

        config.fill_blanks();
        config.validate()?;
        Ok(config)
    }

    fn sources(file: &Path) -> config::ConfigBuilder<config::builder::DefaultState> {
        // NEBOKRUG__HISTORY__START_YEAR=1960 sets history.start_year
        Config::builder()
            .add_source(
                File::from(file.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("NEBOKRUG")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
    }

    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nebokrug").join("config.toml"))
    }

    #[must_use]
    pub fn cache_dir(&self) -> Option<PathBuf> {
        match self.cache.location.as_deref() {
            Some(location) if !location.is_empty() => Some(PathBuf::from(location)),
            _ => dirs::cache_dir().map(|dir| dir.join("nebokrug")),
        }
    }

    /// Blank strings and zero counts in the file mean "use the default"
    fn fill_blanks(&mut self) {
        fn or_default<T: PartialEq + Default>(value: &mut T, fallback: T) {
            if *value == T::default() {
                *value = fallback;
            }
        }

        let weather = WeatherConfig::default();
        or_default(&mut self.weather.forecast_base_url, weather.forecast_base_url);
        or_default(&mut self.weather.archive_base_url, weather.archive_base_url);
        or_default(&mut self.weather.geocoding_base_url, weather.geocoding_base_url);
        or_default(&mut self.weather.timeout_seconds, weather.timeout_seconds);

        let history = HistoryConfig::default();
        or_default(&mut self.history.start_year, history.start_year);
        or_default(&mut self.history.concurrency, history.concurrency);

        let ai = AiConfig::default();
        or_default(&mut self.ai.service_url, ai.service_url);
        or_default(&mut self.ai.timeout_seconds, ai.timeout_seconds);
        or_default(&mut self.ai.model, ai.model);
        or_default(&mut self.ai.api_base_url, ai.api_base_url);

        or_default(&mut self.cache.ttl_hours, CacheConfig::default().ttl_hours);

        let logging = LoggingConfig::default();
        or_default(&mut self.logging.level, logging.level);
        or_default(&mut self.logging.format, logging.format);
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(key) = &self.ai.api_key {
            ensure(key.len() >= 8, || {
                "ai.api_key is set but too short to be a real key".to_string()
            })?;
        }

        ensure(self.weather.timeout_seconds <= 300, || {
            "weather.timeout_seconds must be at most 300".to_string()
        })?;
        ensure(self.weather.max_retries <= 10, || {
            "weather.max_retries must be at most 10".to_string()
        })?;

        let this_year = Local::now().year();
        ensure(
            (ARCHIVE_FIRST_YEAR..this_year).contains(&self.history.start_year),
            || {
                format!(
                    "history.start_year must be between {ARCHIVE_FIRST_YEAR} and {}",
                    this_year - 1
                )
            },
        )?;
        ensure(self.history.concurrency <= 32, || {
            "history.concurrency must be at most 32".to_string()
        })?;

        ensure(self.ai.timeout_seconds <= 600, || {
            "ai.timeout_seconds must be at most 600".to_string()
        })?;
        ensure(self.cache.ttl_hours <= 24 * 365, || {
            "cache.ttl_hours must be at most 8760".to_string()
        })?;

        ensure(LOG_LEVELS.contains(&self.logging.level.as_str()), || {
            format!(
                "logging.level '{}' is not one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )
        })?;
        ensure(LOG_FORMATS.contains(&self.logging.format.as_str()), || {
            format!(
                "logging.format '{}' is not one of {}",
                self.logging.format,
                LOG_FORMATS.join(", ")
            )
        })?;

        for (name, url) in [
            ("weather.forecast_base_url", &self.weather.forecast_base_url),
            ("weather.archive_base_url", &self.weather.archive_base_url),
            ("weather.geocoding_base_url", &self.weather.geocoding_base_url),
            ("ai.service_url", &self.ai.service_url),
            ("ai.api_base_url", &self.ai.api_base_url),
        ] {
            ensure(is_http_url(url), || format!("{name} must be an http(s) URL"))?;
        }

        Ok(())
    }
}
