//! Error types and handling for the placecast pipeline

use thiserror::Error;

/// Main error type for location resolution and weather aggregation.
///
/// Every upstream failure is converted into one of these variants at the
/// adapter boundary. Variants only carry strings so a failure can be kept in
/// the resolver state and handed to more than one observer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacecastError {
    /// The geocoding provider answered with a non-success status
    #[error("Geocoding service unavailable: {details}")]
    GeocodeUnavailable { details: String },

    /// The geocoding provider could not be reached or sent an unreadable body
    #[error("Geocoding transport error: {details}")]
    GeocodeTransport { details: String },

    /// Forward geocoding produced no candidates
    #[error("Location not found: {query}")]
    LocationNotFound { query: String },

    /// Device position could not be acquired (denied, timed out, already attempted)
    #[error("Geolocation unavailable: {reason}")]
    GeolocationUnavailable { reason: String },

    /// The weather provider failed or returned a malformed payload
    #[error("Weather unavailable: {details}")]
    WeatherUnavailable { details: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A newer resolution replaced this one before it completed
    #[error("Resolution {generation} was superseded by a newer request")]
    Superseded { generation: u64 },
}

impl PlacecastError {
    pub fn geocode_unavailable<S: Into<String>>(details: S) -> Self {
        Self::GeocodeUnavailable {
            details: details.into(),
        }
    }

    pub fn geocode_transport<S: Into<String>>(details: S) -> Self {
        Self::GeocodeTransport {
            details: details.into(),
        }
    }

    pub fn location_not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    pub fn geolocation_unavailable<S: Into<String>>(reason: S) -> Self {
        Self::GeolocationUnavailable {
            reason: reason.into(),
        }
    }

    pub fn weather_unavailable<S: Into<String>>(details: S) -> Self {
        Self::WeatherUnavailable {
            details: details.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for failures that came from a geocoding provider
    #[must_use]
    pub fn is_geocode_failure(&self) -> bool {
        matches!(
            self,
            Self::GeocodeUnavailable { .. } | Self::GeocodeTransport { .. }
        )
    }

    /// Get the single user-facing message for a failed resolution attempt
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlacecastError::GeocodeUnavailable { .. } | PlacecastError::GeocodeTransport { .. } => {
                "Failed to fetch location.".to_string()
            }
            PlacecastError::LocationNotFound { .. } => "Location not found.".to_string(),
            PlacecastError::GeolocationUnavailable { .. } => {
                "Location access denied or unavailable. Please search manually.".to_string()
            }
            PlacecastError::WeatherUnavailable { .. } => {
                "Failed to fetch weather data.".to_string()
            }
            PlacecastError::Validation { message } => format!("Invalid input: {message}"),
            PlacecastError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            PlacecastError::Superseded { .. } => {
                "A newer location request replaced this one.".to_string()
            }
        }
    }
}
