//! Data models for the `NeboKrug` application
//!
//! - Location: saved places and coordinate checks
//! - Daily: daily aggregates and current conditions
//! - Units: unit selectors and their provider codes

pub mod daily;
pub mod location;
pub mod units;

pub use daily::{CurrentConditions, DailyRecord};
pub use location::Location;
pub use units::{
    InvalidUnitSelection, PrecipitationUnit, TemperatureUnit, UnitKind, UnitSelection,
    WindSpeedUnit,
};
