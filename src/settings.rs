//! User settings persisted as JSON in the platform config directory
//!
//! The file holds the selected units, saved locations and the interface
//! locale. Every load and save validates the content; there is no
//! process-wide cache, callers hold the [`Settings`] they loaded.

use crate::models::{Location, PrecipitationUnit, TemperatureUnit, UnitSelection, WindSpeedUnit};
use crate::{NeboKrugError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

const SETTINGS_DIR: &str = "NeboKrug";
const SETTINGS_FILE: &str = "settings.json";

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ua,
}

impl Locale {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ua => "ua",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = NeboKrugError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ua" | "uk" => Ok(Locale::Ua),
            other => Err(NeboKrugError::validation(format!(
                "unsupported locale '{other}', expected 'en' or 'ua'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub temperature_unit: TemperatureUnit,
    pub wind_speed_unit: WindSpeedUnit,
    pub precipitation_unit: PrecipitationUnit,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub locale: Locale,
}

impl Settings {
    #[must_use]
    pub fn units(&self) -> UnitSelection {
        UnitSelection::new(
            self.temperature_unit,
            self.wind_speed_unit,
            self.precipitation_unit,
        )
    }

    pub fn set_units(&mut self, units: UnitSelection) {
        self.temperature_unit = units.temperature;
        self.wind_speed_unit = units.wind_speed;
        self.precipitation_unit = units.precipitation;
    }

    pub fn validate(&self) -> Result<()> {
        for location in &self.locations {
            if location.name.trim().is_empty() {
                return Err(NeboKrugError::settings("location name cannot be empty"));
            }
            location
                .validate()
                .map_err(|e| NeboKrugError::settings(format!("location '{}': {e}", location.name)))?;
        }
        Ok(())
    }

    /// Saved location whose name matches, ignoring case
    #[must_use]
    pub fn find_location(&self, name: &str) -> Option<&Location> {
        let name = name.trim().to_lowercase();
        self.locations
            .iter()
            .find(|l| l.name.to_lowercase() == name)
    }
}

/// Reads and writes [`Settings`] at a fixed path
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<platform config dir>/NeboKrug/settings.json`
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| NeboKrugError::settings("no configuration directory on this platform"))?;
        Ok(Self::new(dir.join(SETTINGS_DIR).join(SETTINGS_FILE)))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, returning defaults when the file does not exist yet
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            debug!("No settings at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            NeboKrugError::settings(format!("{} is not valid: {e}", self.path.display()))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)?;

        info!("Settings saved to {}", self.path.display());
        Ok(())
    }

    /// Replace the saved locations, keeping everything else
    pub fn save_locations(&self, locations: Vec<Location>) -> Result<Settings> {
        let mut settings = self.load()?;
        settings.locations = locations;
        self.save(&settings)?;
        Ok(settings)
    }

    pub fn units(&self) -> Result<UnitSelection> {
        Ok(self.load()?.units())
    }
}
