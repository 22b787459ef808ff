//! OpenWeather One Call API client
//!
//! One request returns current conditions, 48 hourly points and 8 daily
//! points. The raw response is deserialized leniently and then validated into
//! a [`WeatherPayload`]; anything without a usable `current` block is rejected.

use std::time::Instant;

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::{WeatherPayload, WeatherSource};
use crate::config::PlacecastConfig;
use crate::http::{build_client, redact};
use crate::models::{Coordinates, CurrentConditions, DayPoint, HourPoint, UnitSystem};
use crate::{PlacecastError, Result};

/// One Call response as sent by the provider
#[derive(Debug, Deserialize)]
pub struct OneCallResponse {
    #[serde(default)]
    pub timezone_offset: i32,
    pub current: Option<RawCurrent>,
    #[serde(default)]
    pub hourly: Vec<RawHour>,
    #[serde(default)]
    pub daily: Vec<RawDay>,
}

#[derive(Debug, Deserialize)]
pub struct RawCondition {
    pub id: i32,
    #[serde(default)]
    pub description: String,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawCurrent {
    pub dt: i64,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub dew_point: Option<f64>,
    pub uvi: Option<f64>,
    pub visibility: Option<f64>,
    pub wind_speed: f64,
    pub wind_deg: Option<f64>,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
}

#[derive(Debug, Deserialize)]
pub struct RawHour {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    pub wind_deg: Option<f64>,
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
}

#[derive(Debug, Deserialize)]
pub struct RawDayTemp {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawDay {
    pub dt: i64,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub moon_phase: Option<f64>,
    pub temp: RawDayTemp,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    pub wind_deg: Option<f64>,
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
}

/// (code, description, icon) of the first condition, if any
fn primary_condition(conditions: Vec<RawCondition>) -> Option<(i32, String, Option<String>)> {
    conditions
        .into_iter()
        .next()
        .map(|c| (c.id, c.description, c.icon))
}

impl OneCallResponse {
    /// Validate into a payload. A missing `current` block or a current block
    /// without a condition is malformed.
    pub fn into_payload(self, units: UnitSystem) -> Result<WeatherPayload> {
        let current = self
            .current
            .ok_or_else(|| PlacecastError::weather_unavailable("Weather data is incomplete: missing current conditions"))?;

        let (condition_code, description, icon) = primary_condition(current.weather)
            .ok_or_else(|| PlacecastError::weather_unavailable("Weather data is incomplete: missing current condition"))?;

        let hourly = self
            .hourly
            .into_iter()
            .map(|hour| {
                let (condition_code, description, icon) =
                    primary_condition(hour.weather).unwrap_or_default();
                HourPoint {
                    dt: hour.dt,
                    temp: hour.temp,
                    feels_like: hour.feels_like,
                    humidity: hour.humidity,
                    wind_speed: hour.wind_speed,
                    wind_deg: hour.wind_deg,
                    pop: hour.pop,
                    condition_code,
                    description,
                    icon,
                }
            })
            .collect();

        let daily: Vec<DayPoint> = self
            .daily
            .into_iter()
            .map(|day| {
                let (condition_code, description, icon) =
                    primary_condition(day.weather).unwrap_or_default();
                DayPoint {
                    dt: day.dt,
                    sunrise: day.sunrise,
                    sunset: day.sunset,
                    temp_min: day.temp.min,
                    temp_max: day.temp.max,
                    humidity: day.humidity,
                    wind_speed: day.wind_speed,
                    wind_deg: day.wind_deg,
                    pop: day.pop,
                    moon_phase: day.moon_phase,
                    condition_code,
                    description,
                    icon,
                }
            })
            .collect();

        let moon_phase = daily.first().and_then(|day| day.moon_phase);

        Ok(WeatherPayload {
            units,
            timezone_offset: self.timezone_offset,
            current: CurrentConditions {
                dt: current.dt,
                temp: current.temp,
                feels_like: current.feels_like,
                pressure: current.pressure,
                humidity: current.humidity,
                visibility: current.visibility,
                wind_speed: current.wind_speed,
                wind_deg: current.wind_deg,
                condition_code,
                description,
                icon,
                sunrise: current.sunrise.unwrap_or(0),
                sunset: current.sunset.unwrap_or(0),
            },
            dew_point: current.dew_point,
            uv_index: current.uvi,
            moon_phase,
            hourly,
            daily,
        })
    }
}

/// Weather API client for OpenWeather One Call 3.0
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(client: ClientWithMiddleware, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &PlacecastConfig) -> Result<Self> {
        let api_key = config
            .weather
            .api_key
            .clone()
            .ok_or_else(|| PlacecastError::config("Weather API key is required (weather.api_key)"))?;
        let client = build_client(config.weather.max_retries)?;
        Ok(Self::new(client, &config.weather.base_url, api_key))
    }
}

impl WeatherSource for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn fetch(&self, coordinates: Coordinates, units: UnitSystem) -> Result<WeatherPayload> {
        info!(
            "Getting weather for coordinates: {} ({})",
            coordinates.format_coordinates(),
            units
        );
        let start_time = Instant::now();

        let url = format!(
            "{}/data/3.0/onecall?lat={}&lon={}&units={}&exclude=minutely,alerts&appid={}",
            self.base_url,
            coordinates.lat,
            coordinates.lon,
            units.as_query(),
            urlencoding::encode(&self.api_key)
        );
        debug!("Weather API request: {}", redact(&url));

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Weather request failed: {}", e);
            PlacecastError::weather_unavailable(format!("Weather request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Weather API returned {}: {}", status, body);
            return Err(PlacecastError::weather_unavailable(format!(
                "Weather API request failed with status: {status}"
            )));
        }

        let raw: OneCallResponse = response.json().await.map_err(|e| {
            error!("Failed to parse weather response: {}", e);
            PlacecastError::weather_unavailable(format!("Invalid weather data received: {e}"))
        })?;

        let payload = raw.into_payload(units)?;

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved weather with {} hourly and {} daily points in {:.3}s",
            payload.hourly.len(),
            payload.daily.len(),
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!("Slow weather API response: {:.3}s", total_duration.as_secs_f64());
        }

        Ok(payload)
    }
}
