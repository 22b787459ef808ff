//! Weather snapshot model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ResolvedPlace, UnitSystem};

/// Current conditions as reported by the provider, in the snapshot's unit system
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Observation time, Unix seconds
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    /// Pressure in hPa
    pub pressure: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Visibility in meters, always provider-native
    pub visibility: Option<f64>,
    pub wind_speed: f64,
    /// Wind direction in degrees (meteorological)
    pub wind_deg: Option<f64>,
    pub condition_code: i32,
    pub description: String,
    pub icon: Option<String>,
    /// Sunrise, Unix seconds. `0` when the provider omitted it.
    pub sunrise: i64,
    /// Sunset, Unix seconds. `0` when the provider omitted it.
    pub sunset: i64,
}

/// One entry of the hourly series
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourPoint {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_deg: Option<f64>,
    /// Probability of precipitation, 0..1
    pub pop: f64,
    pub condition_code: i32,
    pub description: String,
    pub icon: Option<String>,
}

/// One entry of the daily forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayPoint {
    pub dt: i64,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_deg: Option<f64>,
    pub pop: f64,
    pub moon_phase: Option<f64>,
    pub condition_code: i32,
    pub description: String,
    pub icon: Option<String>,
}

/// Complete weather view-model for the currently resolved place.
///
/// Replaced wholesale on every resolution or unit refresh.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub units: UnitSystem,
    pub current: CurrentConditions,
    pub is_night: bool,
    /// `h:mm AM/PM` in the place's wall-clock time
    pub local_time_label: String,
    /// Offset of the place's local time from UTC, in seconds
    pub utc_offset_seconds: i32,
    pub dew_point: Option<f64>,
    pub uv_index: Option<f64>,
    pub moon_phase: Option<f64>,
    pub hourly: Vec<HourPoint>,
    pub daily: Vec<DayPoint>,
    /// Fallback display name with raw state/country codes
    pub display_name: String,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Today's (min, max) temperature, when the daily block is present
    #[must_use]
    pub fn today_range(&self) -> Option<(f64, f64)> {
        self.daily.first().map(|day| (day.temp_min, day.temp_max))
    }
}

/// The observable pair produced by one successful resolution
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Resolution {
    pub place: ResolvedPlace,
    pub snapshot: WeatherSnapshot,
}
