//! `placecast` - location resolution and weather aggregation
//!
//! Turns a device position, a search text or a picked place into a
//! normalized place identity and one consistent weather snapshot, merging a
//! geocoding provider and a weather provider that fail independently.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod geocode;
pub mod geolocation;
pub mod http;
pub mod location_resolver;
pub mod models;
pub mod presentation;
pub mod telemetry;
pub mod units_controller;
pub mod weather;
pub mod web;

#[cfg(test)]
mod test_support;

// Re-export core types for public API
pub use aggregator::WeatherAggregator;
pub use config::PlacecastConfig;
pub use context::{CommitOutcome, ResolutionContext, ResolutionPhase};
pub use error::PlacecastError;
pub use geocode::{Geocoder, GoogleGeocodingClient, HttpGeocoder, PlaceSearchClient, QueryParser};
pub use geolocation::{ConfiguredPosition, DeviceLocator, PositionOptions, PositionSource};
pub use location_resolver::LocationResolver;
pub use models::{Coordinates, LocationQuery, Resolution, ResolvedPlace, UnitSystem, WeatherSnapshot};
pub use units_controller::{UnitToggle, UnitsController};
pub use weather::{OpenWeatherClient, WeatherSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlacecastError>;
