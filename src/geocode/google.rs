//! Google Geocoding API client (reverse geocoding)

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use super::components::{AddressComponent, select_place_name};
use super::PlaceName;
use crate::config::PlacecastConfig;
use crate::http::{build_client, redact};
use crate::models::Coordinates;
use crate::{PlacecastError, Result};

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    status: Option<String>,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

/// Validated reverse-geocode response
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeEnvelope {
    /// `status` absent or `"OK"`; one component list per result
    Success { results: Vec<Vec<AddressComponent>> },
    /// Any other `status`, e.g. `ZERO_RESULTS` or `REQUEST_DENIED`
    ProviderError {
        status: String,
        message: Option<String>,
    },
}

impl GeocodeEnvelope {
    /// Validate a raw provider body
    pub fn from_value(body: &Value) -> Result<Self> {
        let raw = RawEnvelope::deserialize(body).map_err(|e| {
            PlacecastError::geocode_transport(format!("Malformed geocoding response: {e}"))
        })?;

        match raw.status {
            Some(status) if status != "OK" => Ok(Self::ProviderError {
                status,
                message: raw.error_message,
            }),
            _ => Ok(Self::Success {
                results: raw
                    .results
                    .into_iter()
                    .map(|r| r.address_components)
                    .collect(),
            }),
        }
    }

    /// Provider errors become `GeocodeUnavailable` with the message or status as details
    pub fn into_results(self) -> Result<Vec<Vec<AddressComponent>>> {
        match self {
            Self::Success { results } => Ok(results),
            Self::ProviderError { status, message } => {
                Err(PlacecastError::geocode_unavailable(message.unwrap_or(status)))
            }
        }
    }
}

/// Client for `GET {base}/geocode/json?latlng=lat,lon&key=...`
#[derive(Debug, Clone)]
pub struct GoogleGeocodingClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl GoogleGeocodingClient {
    pub fn new(client: ClientWithMiddleware, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &PlacecastConfig) -> Result<Self> {
        let api_key = config.geocoding.api_key.clone().ok_or_else(|| {
            PlacecastError::config("Geocoding API key is required (geocoding.api_key)")
        })?;
        let client = build_client(config.weather.max_retries)?;
        Ok(Self::new(client, &config.geocoding.base_url, api_key))
    }

    /// Fetch the provider envelope and return it untouched when its status is OK.
    ///
    /// Used as-is by the reverse-geocode proxy endpoint.
    #[instrument(skip(self))]
    pub async fn reverse_geocode_raw(&self, lat: f64, lon: f64) -> Result<Value> {
        let url = format!(
            "{}/geocode/json?latlng={},{}&key={}",
            self.base_url,
            lat,
            lon,
            urlencoding::encode(&self.api_key)
        );
        debug!("Reverse geocoding request: {}", redact(&url));

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Reverse geocoding request failed: {}", e);
            PlacecastError::geocode_transport(e.to_string())
        })?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            error!("Failed to read reverse geocoding response: {}", e);
            PlacecastError::geocode_transport(format!("Invalid geocoding response body: {e}"))
        })?;

        match GeocodeEnvelope::from_value(&body)? {
            GeocodeEnvelope::ProviderError { status, message } => {
                error!(
                    "Geocoding API error: {} {}",
                    status,
                    message.as_deref().unwrap_or("")
                );
                Err(PlacecastError::geocode_unavailable(message.unwrap_or(status)))
            }
            GeocodeEnvelope::Success { .. } if !status.is_success() => {
                error!("Geocoding API returned HTTP {}", status);
                Err(PlacecastError::geocode_unavailable(format!("HTTP {status}")))
            }
            GeocodeEnvelope::Success { .. } => Ok(body),
        }
    }

    /// Reverse geocode and select the place name from the first result
    pub async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<PlaceName> {
        let body = self.reverse_geocode_raw(coordinates.lat, coordinates.lon).await?;
        let results = GeocodeEnvelope::from_value(&body)?.into_results()?;

        let name = results
            .first()
            .map(|components| select_place_name(components))
            .unwrap_or_default();

        info!(
            "Reverse geocoded {} to city='{}' state='{}' country='{}'",
            coordinates.format_coordinates(),
            name.city,
            name.state,
            name.country
        );
        Ok(name)
    }
}
