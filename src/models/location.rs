//! Location model for geographic coordinates and metadata

use crate::{NeboKrugError, Result};
use serde::{Deserialize, Serialize};

/// A named place the user can fetch weather for
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Location name (city, village, etc.)
    pub name: String,
    /// Country name as reported by the geocoder
    pub country: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// First-level administrative area (region, oblast, state)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(name: String, country: String, latitude: f64, longitude: f64) -> Self {
        Self {
            name,
            country,
            latitude,
            longitude,
            admin1: None,
        }
    }

    #[must_use]
    pub fn with_admin1(mut self, admin1: Option<String>) -> Self {
        self.admin1 = admin1.filter(|a| !a.is_empty());
        self
    }

    /// Check that the coordinates are on the globe
    pub fn validate(&self) -> Result<()> {
        validate_coordinates(self.latitude, self.longitude)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(admin1) = &self.admin1 {
            write!(f, ", {admin1}")?;
        }
        if !self.country.is_empty() {
            write!(f, ", {}", self.country)?;
        }
        Ok(())
    }
}

/// Reject latitudes outside [-90, 90] and longitudes outside [-180, 180]
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(NeboKrugError::validation(format!(
            "Latitude must be between -90 and 90, got: {latitude}"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(NeboKrugError::validation(format!(
            "Longitude must be between -180 and 180, got: {longitude}"
        )));
    }
    Ok(())
}

#[must_use]
pub fn round_coordinates(latitude: f64, longitude: f64, precision: u32) -> (f64, f64) {
    let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
    let lat = (latitude * multiplier).round() / multiplier;
    let lon = (longitude * multiplier).round() / multiplier;
    (lat, lon)
}
