//! Geocoding adapters
//!
//! Reverse geocoding turns coordinates into a place name through the Google
//! Geocoding API; forward geocoding turns search text into coordinate
//! candidates through the OpenWeather geocoding API. Both are exposed to the
//! resolver through the [`Geocoder`] trait.

pub mod components;
pub mod google;
pub mod parser;
pub mod search;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::Result;
use crate::config::PlacecastConfig;
use crate::models::{Coordinates, DEFAULT_COUNTRY, UnitSystem};

pub use components::{AddressComponent, select_place_name};
pub use google::{GeocodeEnvelope, GoogleGeocodingClient};
pub use parser::{ParsedInput, QueryParser};
pub use search::PlaceSearchClient;

/// Place name picked from a reverse-geocode result.
///
/// Missing components are empty strings; `country` defaults to `"US"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceName {
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip: String,
}

impl Default for PlaceName {
    fn default() -> Self {
        Self {
            city: String::new(),
            state: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            zip: String::new(),
        }
    }
}

/// A coordinate candidate produced by forward geocoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    pub state: Option<String>,
    pub country: String,
    pub zip: Option<String>,
    pub coordinates: Coordinates,
}

/// Geocoding boundary used by the location resolver.
///
/// Implementations convert every upstream failure into a typed error and
/// never panic.
pub trait Geocoder {
    /// Resolve coordinates into a place name
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<PlaceName>;

    /// Resolve search text into coordinate candidates, best match first.
    /// An empty vector means "no match" and is not an error.
    async fn forward_geocode(&self, text: &str, units: UnitSystem) -> Result<Vec<PlaceCandidate>>;
}

/// Production geocoder combining the Google reverse client and the
/// OpenWeather search client
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    reverse: GoogleGeocodingClient,
    search: PlaceSearchClient,
}

impl HttpGeocoder {
    pub fn new(reverse: GoogleGeocodingClient, search: PlaceSearchClient) -> Self {
        Self { reverse, search }
    }

    /// Build both clients from configuration
    pub fn from_config(config: &PlacecastConfig) -> Result<Self> {
        Ok(Self::new(
            GoogleGeocodingClient::from_config(config)?,
            PlaceSearchClient::from_config(config)?,
        ))
    }
}

impl Geocoder for HttpGeocoder {
    #[instrument(skip(self))]
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<PlaceName> {
        self.reverse.reverse_geocode(coordinates).await
    }

    #[instrument(skip(self))]
    async fn forward_geocode(&self, text: &str, units: UnitSystem) -> Result<Vec<PlaceCandidate>> {
        self.search.search(text).await
    }
}

impl<T: Geocoder> Geocoder for Arc<T> {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<PlaceName> {
        (**self).reverse_geocode(coordinates).await
    }

    async fn forward_geocode(&self, text: &str, units: UnitSystem) -> Result<Vec<PlaceCandidate>> {
        (**self).forward_geocode(text, units).await
    }
}
