//! Data models for the placecast pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Location: validated coordinates, location queries and resolved places
//! - Units: the active unit system
//! - Weather: the aggregated weather snapshot handed to consumers

pub mod location;
pub mod units;
pub mod weather;

// Re-export all public types for convenient access
pub use location::{Coordinates, LocationQuery, ResolvedPlace, DEFAULT_COUNTRY};
pub use units::UnitSystem;
pub use weather::{CurrentConditions, DayPoint, HourPoint, Resolution, WeatherSnapshot};
