//! Configuration management for placecast
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PlacecastError;
use crate::models::UnitSystem;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacecastConfig {
    /// Geocoding provider configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Reverse-geocode proxy server
    #[serde(default)]
    pub server: ServerConfig,
    /// Default application settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Position reported as the device location
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Google Geocoding API key used for reverse geocoding
    pub api_key: Option<String>,
    /// Base URL of the reverse geocoding API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Base URL of the forward (search) geocoding API
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,
    /// Maximum number of candidates requested for a text search
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
    /// Country assumed for bare postal code searches
    #[serde(default = "default_country")]
    pub default_country: String,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeather API key (also used for text search)
    pub api_key: Option<String>,
    /// Base URL for the weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_weather_max_retries")]
    pub max_retries: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Unit system active at startup
    #[serde(default)]
    pub units: UnitSystem,
    /// Device geolocation timeout in milliseconds
    #[serde(default = "default_geolocation_timeout_ms")]
    pub geolocation_timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_search_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_search_limit() -> u32 {
    5
}

fn default_country() -> String {
    crate::models::DEFAULT_COUNTRY.to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_weather_max_retries() -> u32 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_geolocation_timeout_ms() -> u64 {
    5000
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_base_url(),
            search_base_url: default_search_base_url(),
            search_limit: default_search_limit(),
            default_country: default_country(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            max_retries: default_weather_max_retries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            units: UnitSystem::default(),
            geolocation_timeout_ms: default_geolocation_timeout_ms(),
        }
    }
}

impl Default for PlacecastConfig {
    fn default() -> Self {
        Self {
            geocoding: GeocodingConfig::default(),
            weather: WeatherConfig::default(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            defaults: DefaultsConfig::default(),
            device: DeviceConfig::default(),
        }
    }
}

impl DefaultsConfig {
    #[must_use]
    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }
}

impl PlacecastConfig {
    /// Load configuration from `config_path` (or the default location) and
    /// `PLACECAST_` environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // PLACECAST_WEATHER__API_KEY -> weather.api_key
        builder = builder.add_source(
            Environment::with_prefix("PLACECAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlacecastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("placecast").join("config.toml"))
    }

    /// Apply default values to empty or zeroed configuration fields
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.search_base_url.is_empty() {
            self.geocoding.search_base_url = default_search_base_url();
        }
        if self.geocoding.search_limit == 0 {
            self.geocoding.search_limit = default_search_limit();
        }
        if self.geocoding.default_country.is_empty() {
            self.geocoding.default_country = default_country();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.port == 0 {
            self.server.port = default_server_port();
        }
        if self.defaults.geolocation_timeout_ms == 0 {
            self.defaults.geolocation_timeout_ms = default_geolocation_timeout_ms();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_device()?;
        Ok(())
    }

    /// Validate API keys and credentials when they are present
    pub fn validate_api_keys(&self) -> Result<()> {
        for (label, key) in [
            ("Geocoding", &self.geocoding.api_key),
            ("Weather", &self.weather.api_key),
        ] {
            let Some(api_key) = key else { continue };

            if api_key.is_empty() {
                return Err(PlacecastError::config(format!(
                    "{label} API key cannot be empty if provided. Either remove it or provide a valid key."
                ))
                .into());
            }

            if api_key.len() < 8 {
                return Err(PlacecastError::config(format!(
                    "{label} API key appears to be invalid (too short). Please check your API key."
                ))
                .into());
            }

            if api_key.len() > 100 {
                return Err(PlacecastError::config(format!(
                    "{label} API key appears to be invalid (too long). Please check your API key."
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.max_retries > 10 {
            return Err(PlacecastError::config("Weather API max retries cannot exceed 10").into());
        }

        if self.geocoding.search_limit > 10 {
            return Err(PlacecastError::config("Geocoding search limit cannot exceed 10").into());
        }

        if self.defaults.geolocation_timeout_ms > 60_000 {
            return Err(PlacecastError::config(
                "Geolocation timeout cannot exceed 60000 ms",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlacecastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlacecastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (label, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Geocoding search", &self.geocoding.search_base_url),
            ("Weather", &self.weather.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(PlacecastError::config(format!(
                    "{label} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_device(&self) -> Result<()> {
        match (self.device.latitude, self.device.longitude) {
            (Some(lat), Some(lon)) => {
                crate::models::Coordinates::new(lat, lon)
                    .with_context(|| "Invalid [device] coordinates")?;
                Ok(())
            }
            (None, None) => Ok(()),
            _ => Err(PlacecastError::config(
                "Device latitude and longitude must be set together",
            )
            .into()),
        }
    }
}
