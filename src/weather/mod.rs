//! Weather provider adapter
//!
//! [`WeatherSource`] is the boundary the resolver and the units controller
//! fetch through. A [`WeatherPayload`] only exists once the provider response
//! has been validated: it always carries a current-conditions block.

pub mod open_weather;

use std::sync::Arc;

use crate::Result;
use crate::models::{Coordinates, CurrentConditions, DayPoint, HourPoint, UnitSystem};

pub use open_weather::OpenWeatherClient;

/// Validated provider response for one coordinate pair and unit system
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPayload {
    pub units: UnitSystem,
    /// Offset of the place's local time from UTC, in seconds
    pub timezone_offset: i32,
    pub current: CurrentConditions,
    pub dew_point: Option<f64>,
    pub uv_index: Option<f64>,
    pub moon_phase: Option<f64>,
    pub hourly: Vec<HourPoint>,
    pub daily: Vec<DayPoint>,
}

/// Weather boundary: current, hourly and daily data in one logical call
pub trait WeatherSource {
    async fn fetch(&self, coordinates: Coordinates, units: UnitSystem) -> Result<WeatherPayload>;
}

impl<T: WeatherSource> WeatherSource for Arc<T> {
    async fn fetch(&self, coordinates: Coordinates, units: UnitSystem) -> Result<WeatherPayload> {
        (**self).fetch(coordinates, units).await
    }
}
