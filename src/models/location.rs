//! Location models: coordinates, queries and resolved places

use serde::{Deserialize, Serialize};

use crate::{PlacecastError, Result};

/// Country assumed when a provider does not report one
pub const DEFAULT_COUNTRY: &str = "US";

/// Validated latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Create coordinates, rejecting values outside [-90, 90] / [-180, 180]
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(PlacecastError::validation(format!(
                "Latitude must be between -90 and 90, got: {lat}"
            )));
        }

        if !(-180.0..=180.0).contains(&lon) {
            return Err(PlacecastError::validation(format!(
                "Longitude must be between -180 and 180, got: {lon}"
            )));
        }

        Ok(Self { lat, lon })
    }

    /// Format as `"lat, lon"` with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// A request to resolve a location. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    /// A position reported by the device (or a bare map pin without a name)
    DeviceCoordinates(Coordinates),
    /// Free-text search: city name, "city, state" or postal code
    TextQuery { raw: String },
    /// A place picked from autocomplete: name and coordinates already known
    ExplicitPlace {
        name: String,
        state: String,
        country: String,
        coordinates: Coordinates,
    },
}

impl LocationQuery {
    pub fn device(lat: f64, lon: f64) -> Result<Self> {
        Ok(Self::DeviceCoordinates(Coordinates::new(lat, lon)?))
    }

    pub fn text<S: Into<String>>(raw: S) -> Self {
        Self::TextQuery { raw: raw.into() }
    }

    pub fn explicit(
        name: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
        lat: f64,
        lon: f64,
    ) -> Result<Self> {
        Ok(Self::ExplicitPlace {
            name: name.into(),
            state: state.into(),
            country: country.into(),
            coordinates: Coordinates::new(lat, lon)?,
        })
    }
}

/// Normalized place identity for one resolution.
///
/// `city`, `state` and `zip` are `None` when geocoding did not provide them;
/// the display name then falls back to ZIP or raw coordinates.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedPlace {
    pub coordinates: Coordinates,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: String,
    pub zip: Option<String>,
}

impl ResolvedPlace {
    /// A place known only by its coordinates
    #[must_use]
    pub fn unnamed(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            city: None,
            state: None,
            country: DEFAULT_COUNTRY.to_string(),
            zip: None,
        }
    }

    /// Build a place from possibly-empty name components
    #[must_use]
    pub fn from_parts(
        coordinates: Coordinates,
        city: &str,
        state: &str,
        country: &str,
        zip: &str,
    ) -> Self {
        Self {
            coordinates,
            city: non_empty(city),
            state: non_empty(state),
            country: non_empty(country).unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            zip: non_empty(zip),
        }
    }

    /// Fallback display name using raw codes:
    /// `city[, state][, country if not US]`, else `ZIP zip`, else coordinates.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(city) = &self.city {
            let mut name = city.clone();
            if let Some(state) = &self.state {
                name.push_str(", ");
                name.push_str(state);
            }
            if self.country != DEFAULT_COUNTRY {
                name.push_str(", ");
                name.push_str(&self.country);
            }
            name
        } else if let Some(zip) = &self.zip {
            format!("ZIP {zip}")
        } else {
            self.coordinates.format_coordinates()
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
