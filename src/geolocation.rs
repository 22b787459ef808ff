//! Single-shot device geolocation
//!
//! A [`PositionSource`] reports the device position. [`DeviceLocator`] races
//! it against a timer and allows exactly one attempt per locator; callers fall
//! back to manual search afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::{DefaultsConfig, DeviceConfig};
use crate::models::Coordinates;
use crate::{PlacecastError, Result};

/// Acquisition options passed to the position source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Maximum age of a cached position; zero forces a fresh fix
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: false,
            timeout: Duration::from_secs(5),
            maximum_age: Duration::ZERO,
        }
    }
}

impl PositionOptions {
    #[must_use]
    pub fn from_config(defaults: &DefaultsConfig) -> Self {
        Self {
            timeout: defaults.geolocation_timeout(),
            ..Self::default()
        }
    }
}

/// Failure reported by a position source
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PositionError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// Something that can report the device position
pub trait PositionSource {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> std::result::Result<Coordinates, PositionError>;
}

/// Position taken from the `[device]` configuration section
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPosition {
    coordinates: Option<Coordinates>,
}

impl ConfiguredPosition {
    #[must_use]
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self { coordinates }
    }

    pub fn from_config(device: &DeviceConfig) -> Result<Self> {
        let coordinates = match (device.latitude, device.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)?),
            _ => None,
        };
        Ok(Self::new(coordinates))
    }
}

impl PositionSource for ConfiguredPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> std::result::Result<Coordinates, PositionError> {
        self.coordinates
            .ok_or_else(|| PositionError::Unavailable("no device position configured".to_string()))
    }
}

/// Single-attempt locator over a position source
#[derive(Debug)]
pub struct DeviceLocator<S> {
    source: S,
    options: PositionOptions,
    attempted: AtomicBool,
}

impl<S: PositionSource> DeviceLocator<S> {
    pub fn new(source: S, options: PositionOptions) -> Self {
        Self {
            source,
            options,
            attempted: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn attempted(&self) -> bool {
        self.attempted.load(Ordering::SeqCst)
    }

    /// Acquire the device position once.
    ///
    /// Denial, source failure and timeout all become `GeolocationUnavailable`,
    /// as does any call after the first.
    #[instrument(skip(self))]
    pub async fn locate(&self) -> Result<Coordinates> {
        if self.attempted.swap(true, Ordering::SeqCst) {
            warn!("Device geolocation already attempted, not retrying");
            return Err(PlacecastError::geolocation_unavailable(
                "Device geolocation was already attempted",
            ));
        }

        let timeout = self.options.timeout;
        match tokio::time::timeout(timeout, self.source.current_position(&self.options)).await {
            Ok(Ok(coordinates)) => {
                info!("Device position: {}", coordinates.format_coordinates());
                Ok(coordinates)
            }
            Ok(Err(e)) => {
                warn!("Device geolocation failed: {}", e);
                Err(PlacecastError::geolocation_unavailable(e.to_string()))
            }
            Err(_) => {
                warn!("Device geolocation timed out after {:?}", timeout);
                Err(PlacecastError::geolocation_unavailable(format!(
                    "timed out after {}ms",
                    timeout.as_millis()
                )))
            }
        }
    }
}
