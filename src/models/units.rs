//! Measurement unit selections and their provider codes
//!
//! Unit selectors arrive as the labels shown to (and stored for) the user.
//! Mapping a label to a unit is a pure lookup with a permissive fallback:
//! an unrecognized temperature label means Celsius, an unrecognized wind
//! label means miles per hour and an unrecognized precipitation label means
//! millimetres. Callers that want to know about the fallback use
//! [`UnitSelection::from_labels_strict`].

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "Celsius °C")]
    Celsius,
    #[serde(rename = "Fahrenheit °F")]
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindSpeedUnit {
    #[serde(rename = "Km/h")]
    Kmh,
    #[default]
    #[serde(rename = "m/s")]
    Ms,
    #[serde(rename = "mph")]
    Mph,
    #[serde(rename = "Knots")]
    Knots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrecipitationUnit {
    #[default]
    #[serde(rename = "Millimeter")]
    Millimeter,
    #[serde(rename = "Inch")]
    Inch,
}

impl TemperatureUnit {
    pub const ALL: [Self; 2] = [Self::Celsius, Self::Fahrenheit];
    /// Unit used when a label is not recognized
    pub const FALLBACK: Self = Self::Celsius;

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Celsius => "Celsius °C",
            Self::Fahrenheit => "Fahrenheit °F",
        }
    }

    /// Code understood by the Open-Meteo `temperature_unit` parameter
    #[must_use]
    pub const fn api_code(self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.label() == label)
    }
}

impl WindSpeedUnit {
    pub const ALL: [Self; 4] = [Self::Kmh, Self::Ms, Self::Mph, Self::Knots];
    /// Unit used when a label is not recognized
    pub const FALLBACK: Self = Self::Mph;

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Kmh => "Km/h",
            Self::Ms => "m/s",
            Self::Mph => "mph",
            Self::Knots => "Knots",
        }
    }

    /// Code understood by the Open-Meteo `wind_speed_unit` parameter
    #[must_use]
    pub const fn api_code(self) -> &'static str {
        match self {
            Self::Kmh => "kmh",
            Self::Ms => "ms",
            Self::Mph => "mph",
            Self::Knots => "kn",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Kmh => "km/h",
            Self::Ms => "m/s",
            Self::Mph => "mph",
            Self::Knots => "kn",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.label() == label)
    }
}

impl PrecipitationUnit {
    pub const ALL: [Self; 2] = [Self::Millimeter, Self::Inch];
    /// Unit used when a label is not recognized
    pub const FALLBACK: Self = Self::Millimeter;

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Millimeter => "Millimeter",
            Self::Inch => "Inch",
        }
    }

    /// Code understood by the Open-Meteo `precipitation_unit` parameter
    #[must_use]
    pub const fn api_code(self) -> &'static str {
        match self {
            Self::Millimeter => "mm",
            Self::Inch => "inch",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Millimeter => "mm",
            Self::Inch => "in",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.label() == label)
    }
}

/// Which unit selector an [`InvalidUnitSelection`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Temperature,
    WindSpeed,
    Precipitation,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Temperature => write!(f, "temperature"),
            UnitKind::WindSpeed => write!(f, "wind speed"),
            UnitKind::Precipitation => write!(f, "precipitation"),
        }
    }
}

/// An unrecognized unit label that was replaced by the fallback unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidUnitSelection {
    pub kind: UnitKind,
    pub label: String,
    pub fallback: &'static str,
}

impl fmt::Display for InvalidUnitSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown {} unit '{}', using '{}'",
            self.kind, self.label, self.fallback
        )
    }
}

/// The three unit selectors used for every weather request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitSelection {
    pub temperature: TemperatureUnit,
    pub wind_speed: WindSpeedUnit,
    pub precipitation: PrecipitationUnit,
}

impl UnitSelection {
    #[must_use]
    pub const fn new(
        temperature: TemperatureUnit,
        wind_speed: WindSpeedUnit,
        precipitation: PrecipitationUnit,
    ) -> Self {
        Self {
            temperature,
            wind_speed,
            precipitation,
        }
    }

    /// Map user-facing labels to units, silently falling back on unknown labels
    #[must_use]
    pub fn from_labels(temperature: &str, wind_speed: &str, precipitation: &str) -> Self {
        Self::from_labels_strict(temperature, wind_speed, precipitation).0
    }

    /// Map user-facing labels to units, reporting every fallback that was applied
    #[must_use]
    pub fn from_labels_strict(
        temperature: &str,
        wind_speed: &str,
        precipitation: &str,
    ) -> (Self, Vec<InvalidUnitSelection>) {
        let mut invalid = Vec::new();

        let temperature_unit = TemperatureUnit::from_label(temperature).unwrap_or_else(|| {
            invalid.push(InvalidUnitSelection {
                kind: UnitKind::Temperature,
                label: temperature.to_string(),
                fallback: TemperatureUnit::FALLBACK.label(),
            });
            TemperatureUnit::FALLBACK
        });
        let wind_unit = WindSpeedUnit::from_label(wind_speed).unwrap_or_else(|| {
            invalid.push(InvalidUnitSelection {
                kind: UnitKind::WindSpeed,
                label: wind_speed.to_string(),
                fallback: WindSpeedUnit::FALLBACK.label(),
            });
            WindSpeedUnit::FALLBACK
        });
        let precipitation_unit =
            PrecipitationUnit::from_label(precipitation).unwrap_or_else(|| {
                invalid.push(InvalidUnitSelection {
                    kind: UnitKind::Precipitation,
                    label: precipitation.to_string(),
                    fallback: PrecipitationUnit::FALLBACK.label(),
                });
                PrecipitationUnit::FALLBACK
            });

        (
            Self::new(temperature_unit, wind_unit, precipitation_unit),
            invalid,
        )
    }

    /// Query string fragment selecting these units on Open-Meteo endpoints
    #[must_use]
    pub fn query(&self) -> String {
        format!(
            "temperature_unit={}&wind_speed_unit={}&precipitation_unit={}",
            self.temperature.api_code(),
            self.wind_speed.api_code(),
            self.precipitation.api_code()
        )
    }
}
