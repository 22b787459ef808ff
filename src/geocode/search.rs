//! OpenWeather geocoding client (forward geocoding / text search)

use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::PlaceCandidate;
use super::parser::{ParsedInput, QueryParser};
use crate::config::PlacecastConfig;
use crate::http::{build_client, redact};
use crate::models::Coordinates;
use crate::{PlacecastError, Result};

/// Entry of `/geo/1.0/direct`
#[derive(Debug, Deserialize)]
struct DirectResult {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
    state: Option<String>,
}

/// Body of `/geo/1.0/zip`
#[derive(Debug, Deserialize)]
struct ZipResult {
    zip: String,
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
}

/// Forward geocoding against the OpenWeather geocoding API
#[derive(Debug, Clone)]
pub struct PlaceSearchClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    limit: u32,
    default_country: String,
}

impl PlaceSearchClient {
    pub fn new(
        client: ClientWithMiddleware,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        limit: u32,
        default_country: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            limit,
            default_country: default_country.into(),
        }
    }

    pub fn from_config(config: &PlacecastConfig) -> Result<Self> {
        let api_key = config.weather.api_key.clone().ok_or_else(|| {
            PlacecastError::config("Weather API key is required for location search (weather.api_key)")
        })?;
        let client = build_client(config.weather.max_retries)?;
        Ok(Self::new(
            client,
            &config.geocoding.search_base_url,
            api_key,
            config.geocoding.search_limit,
            &config.geocoding.default_country,
        ))
    }

    /// Resolve text into candidates, best first.
    ///
    /// Postal codes are looked up with the zip endpoint first and fall back to a
    /// name search when the provider does not know them.
    pub async fn search(&self, text: &str) -> Result<Vec<PlaceCandidate>> {
        let text = text.trim();
        info!("Geocoding location: '{}'", text);

        if let ParsedInput::PostalCode { code, country } = QueryParser::parse(text) {
            let country = country.unwrap_or_else(|| self.default_country.clone());
            if let Some(candidate) = self.search_zip(&code, &country).await? {
                return Ok(vec![candidate]);
            }
            debug!("Postal code {} unknown, falling back to name search", code);
        }

        let candidates = self.search_direct(text).await?;
        if candidates.is_empty() {
            warn!("No results found for location '{}'", text);
        } else {
            debug!(
                "Geocoding results: {:?}",
                candidates
                    .iter()
                    .map(|c| format!("{} ({})", c.name, c.coordinates.format_coordinates()))
                    .collect::<Vec<_>>()
            );
        }
        Ok(candidates)
    }

    async fn search_zip(&self, code: &str, country: &str) -> Result<Option<PlaceCandidate>> {
        let url = format!(
            "{}/geo/1.0/zip?zip={},{}&appid={}",
            self.base_url,
            urlencoding::encode(code),
            urlencoding::encode(country),
            urlencoding::encode(&self.api_key)
        );

        // Any 4xx means the provider cannot place this code; the name search decides
        let Some(response) = self.get(&url, |status| status.is_client_error()).await? else {
            return Ok(None);
        };
        let result: ZipResult = response.json().await.map_err(|e| {
            PlacecastError::geocode_transport(format!("Invalid zip lookup response: {e}"))
        })?;

        Ok(Coordinates::new(result.lat, result.lon)
            .ok()
            .map(|coordinates| PlaceCandidate {
                name: result.name,
                state: None,
                country: result.country,
                zip: Some(result.zip),
                coordinates,
            }))
    }

    async fn search_direct(&self, text: &str) -> Result<Vec<PlaceCandidate>> {
        let url = format!(
            "{}/geo/1.0/direct?q={}&limit={}&appid={}",
            self.base_url,
            urlencoding::encode(text),
            self.limit,
            urlencoding::encode(&self.api_key)
        );

        let Some(response) = self.get(&url, |status| status == StatusCode::NOT_FOUND).await? else {
            return Ok(Vec::new());
        };
        let results: Vec<DirectResult> = response.json().await.map_err(|e| {
            PlacecastError::geocode_transport(format!("Invalid geocoding response: {e}"))
        })?;

        Ok(results
            .into_iter()
            .filter_map(|result| match Coordinates::new(result.lat, result.lon) {
                Ok(coordinates) => Some(PlaceCandidate {
                    name: result.name,
                    state: result.state.filter(|s| !s.is_empty()),
                    country: result.country,
                    zip: None,
                    coordinates,
                }),
                Err(e) => {
                    warn!("Skipping geocoding candidate '{}': {}", result.name, e);
                    None
                }
            })
            .collect())
    }

    /// Send a GET; `Ok(None)` when `no_match` accepts the status, typed errors
    /// for everything else that is not a success
    async fn get(
        &self,
        url: &str,
        no_match: impl Fn(StatusCode) -> bool,
    ) -> Result<Option<reqwest::Response>> {
        debug!("Geocoding search request: {}", redact(url));

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Geocoding search request failed: {}", e);
            PlacecastError::geocode_transport(e.to_string())
        })?;

        let status = response.status();
        if no_match(status) {
            debug!("Geocoding search returned {}, treating as no match", status);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Geocoding search returned {}: {}", status, body);
            return Err(PlacecastError::geocode_unavailable(format!(
                "HTTP {status}: {body}"
            )));
        }
        Ok(Some(response))
    }
}
