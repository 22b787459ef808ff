//! Unit system switching
//!
//! Toggling flips the shared unit system and re-fetches weather for the place
//! that is currently shown. Geocoding is never repeated. A location query in
//! flight is left alone; it refetches in the new units before it publishes.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::PlacecastError;
use crate::context::ResolutionContext;
use crate::location_resolver::refetch;
use crate::models::UnitSystem;
use crate::weather::WeatherSource;

/// Outcome of a toggle: the new unit system, and the refresh error if the
/// snapshot could not be re-fetched
#[derive(Debug, Clone, PartialEq)]
pub struct UnitToggle {
    pub units: UnitSystem,
    pub error: Option<PlacecastError>,
}

pub struct UnitsController<W> {
    weather: W,
    context: Arc<ResolutionContext>,
}

impl<W: WeatherSource> UnitsController<W> {
    pub fn new(weather: W, context: Arc<ResolutionContext>) -> Self {
        Self { weather, context }
    }

    #[must_use]
    pub fn units(&self) -> UnitSystem {
        self.context.units()
    }

    /// Flip Imperial/Metric and refresh the current snapshot.
    ///
    /// The flip is kept even when the refresh fails; the previous snapshot
    /// then stays observable and the error is returned alongside.
    #[instrument(skip(self))]
    pub async fn toggle(&self) -> UnitToggle {
        let units = self.context.toggle_units();
        info!("Switched units to {}", units);

        let Some((generation, current)) = self.context.begin_refresh() else {
            return UnitToggle { units, error: None };
        };

        let error = refetch(&self.context, &self.weather, generation, current.place, units)
            .await
            .err();
        if let Some(e) = &error {
            warn!("Weather refresh after unit switch failed: {}", e);
        }

        UnitToggle { units, error }
    }
}
