//! `NeboKrug` - "this day in history" weather comparison
//!
//! This library collects the same calendar day across past years from
//! Open-Meteo, ranks today's weather against that history and renders a
//! short human-readable report. It also carries the supporting pieces of the
//! desktop app: settings persistence, geocoding and AI clothing advice.

pub mod ai;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod provider;
pub mod settings;

// Re-export core types for public API
pub use config::AppConfig;
pub use error::NeboKrugError;
pub use history::{
    compare, ComparisonReport, HistoricalSampleSet, HistoryCollector, HistoryJob, JobState,
    PartialDataWarning,
};
pub use models::{CurrentConditions, DailyRecord, Location, UnitSelection};
pub use provider::{ArchiveCache, Geocoder, OpenMeteoClient, WeatherProvider};
pub use settings::{Locale, Settings, SettingsStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, NeboKrugError>;
