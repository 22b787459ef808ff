//! Location Resolution Module
//!
//! Turns a [`LocationQuery`] into a [`ResolvedPlace`] and a [`WeatherSnapshot`]
//! published through the shared [`ResolutionContext`]. Only the most recent
//! query can publish; older ones finish their requests and are discarded.
//!
//! [`WeatherSnapshot`]: crate::models::WeatherSnapshot

use std::sync::Arc;

use futures::future::join;
use tracing::{debug, info, instrument, warn};

use crate::aggregator::WeatherAggregator;
use crate::context::{CommitOutcome, ResolutionContext};
use crate::geocode::Geocoder;
use crate::geolocation::{DeviceLocator, PositionSource};
use crate::models::{Coordinates, LocationQuery, Resolution, ResolvedPlace, UnitSystem};
use crate::weather::{WeatherPayload, WeatherSource};
use crate::{PlacecastError, Result};

/// Service for resolving location queries
pub struct LocationResolver<G, W> {
    geocoder: G,
    weather: W,
    context: Arc<ResolutionContext>,
}

impl<G: Geocoder, W: WeatherSource> LocationResolver<G, W> {
    pub fn new(geocoder: G, weather: W, context: Arc<ResolutionContext>) -> Self {
        Self {
            geocoder,
            weather,
            context,
        }
    }

    #[must_use]
    pub fn context(&self) -> &Arc<ResolutionContext> {
        &self.context
    }

    /// Resolve a query and publish the result if no newer query arrived meanwhile.
    ///
    /// A superseded resolution returns `Superseded` and changes nothing.
    pub async fn resolve_location(&self, query: LocationQuery) -> Result<Resolution> {
        let generation = self.context.begin();
        self.resolve_generation(generation, query).await
    }

    /// Acquire the device position once, then resolve it
    pub async fn resolve_device<S: PositionSource>(&self, locator: &DeviceLocator<S>) -> Result<Resolution> {
        let generation = self.context.begin();
        match locator.locate().await {
            Ok(coordinates) => {
                self.resolve_generation(generation, LocationQuery::DeviceCoordinates(coordinates))
                    .await
            }
            Err(e) => Err(self.fail(generation, e).await),
        }
    }

    /// Record a failure. A unit switch skipped while this resolution was in
    /// flight is then applied to the place still shown.
    async fn fail(&self, generation: u64, error: PlacecastError) -> PlacecastError {
        let error = self.context.fail(generation, error);
        if matches!(error, PlacecastError::Superseded { .. }) {
            return error;
        }

        let units = self.context.units();
        let stale = self
            .context
            .current()
            .is_some_and(|current| current.snapshot.units != units);
        if stale && let Some((refresh, current)) = self.context.begin_refresh() {
            info!("Refreshing {} in {} units", current.snapshot.display_name, units);
            if let Err(e) = refetch(&self.context, &self.weather, refresh, current.place, units).await {
                warn!("Weather refresh in {} units failed: {}", units, e);
            }
        }
        error
    }

    #[instrument(skip(self))]
    async fn resolve_generation(&self, generation: u64, query: LocationQuery) -> Result<Resolution> {
        let units = self.context.units();
        debug!("Resolving location query in {} units", units);

        let outcome = match &query {
            LocationQuery::DeviceCoordinates(coordinates) => {
                self.resolve_coordinates(*coordinates, units).await
            }
            LocationQuery::TextQuery { raw } => self.resolve_text(raw, units).await,
            LocationQuery::ExplicitPlace {
                name,
                state,
                country,
                coordinates,
            } => {
                let place = ResolvedPlace::from_parts(*coordinates, name, state, country, "");
                self.weather
                    .fetch(*coordinates, units)
                    .await
                    .map(|payload| (place, payload))
            }
        };

        match outcome {
            Ok((place, payload)) => {
                let resolution =
                    publish(&self.context, &self.weather, generation, place, payload, units).await?;
                info!(
                    "Resolved location: {} at ({})",
                    resolution.snapshot.display_name,
                    resolution.place.coordinates.format_coordinates()
                );
                Ok(resolution)
            }
            Err(e) => Err(self.fail(generation, e).await),
        }
    }

    /// Geocoding and weather run concurrently; a geocoding failure only
    /// costs the place its name.
    async fn resolve_coordinates(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
    ) -> Result<(ResolvedPlace, WeatherPayload)> {
        let (name, payload) = join(
            self.geocoder.reverse_geocode(coordinates),
            self.weather.fetch(coordinates, units),
        )
        .await;
        let payload = payload?;

        let place = match name {
            Ok(name) => ResolvedPlace::from_parts(coordinates, &name.city, &name.state, &name.country, &name.zip),
            Err(e) => {
                warn!(
                    "Reverse geocoding failed: {}, using coordinates as name",
                    e
                );
                ResolvedPlace::unnamed(coordinates)
            }
        };
        Ok((place, payload))
    }

    /// Forward geocode, take the best candidate, fetch its weather
    async fn resolve_text(&self, raw: &str, units: UnitSystem) -> Result<(ResolvedPlace, WeatherPayload)> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(PlacecastError::validation("Location query cannot be empty"));
        }

        let candidates = self.geocoder.forward_geocode(text, units).await?;
        let Some(best) = candidates.into_iter().next() else {
            return Err(PlacecastError::location_not_found(text));
        };
        debug!(
            "Using geocoding candidate {} at ({})",
            best.name,
            best.coordinates.format_coordinates()
        );

        let payload = self.weather.fetch(best.coordinates, units).await?;
        let place = ResolvedPlace::from_parts(
            best.coordinates,
            &best.name,
            best.state.as_deref().unwrap_or_default(),
            &best.country,
            best.zip.as_deref().unwrap_or_default(),
        );
        Ok((place, payload))
    }
}

/// Fetch weather for an already resolved place and publish it
pub(crate) async fn refetch<W: WeatherSource>(
    context: &ResolutionContext,
    weather: &W,
    generation: u64,
    place: ResolvedPlace,
    units: UnitSystem,
) -> Result<Resolution> {
    match weather.fetch(place.coordinates, units).await {
        Ok(payload) => publish(context, weather, generation, place, payload, units).await,
        Err(e) => Err(context.fail(generation, e)),
    }
}

/// Commit `place` with its weather, refetching (never re-geocoding) for as
/// long as the units were toggled while the weather was in flight.
pub(crate) async fn publish<W: WeatherSource>(
    context: &ResolutionContext,
    weather: &W,
    generation: u64,
    place: ResolvedPlace,
    mut payload: WeatherPayload,
    mut units: UnitSystem,
) -> Result<Resolution> {
    loop {
        let snapshot = WeatherAggregator::aggregate(payload, &place, units);
        let resolution = Resolution {
            place: place.clone(),
            snapshot,
        };
        match context.commit(generation, resolution)? {
            CommitOutcome::Published(resolution) => return Ok(resolution),
            CommitOutcome::UnitsChanged { units: active } => {
                debug!("Units switched to {} while fetching, refetching weather", active);
                units = active;
                payload = match weather.fetch(place.coordinates, units).await {
                    Ok(payload) => payload,
                    Err(e) => return Err(context.fail(generation, e)),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ResolutionPhase;
    use crate::geocode::PlaceName;
    use crate::geolocation::{ConfiguredPosition, PositionOptions};
    use crate::test_support::{FakeGeocoder, FakeWeather, austin, boston, candidate};
    use rstest::rstest;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn resolver(
        geocoder: FakeGeocoder,
    ) -> (
        LocationResolver<Arc<FakeGeocoder>, Arc<FakeWeather>>,
        Arc<FakeGeocoder>,
        Arc<FakeWeather>,
    ) {
        let geocoder = Arc::new(geocoder);
        let weather = Arc::new(FakeWeather::default());
        let context = Arc::new(ResolutionContext::default());
        (
            LocationResolver::new(geocoder.clone(), weather.clone(), context),
            geocoder,
            weather,
        )
    }

    #[tokio::test]
    async fn test_device_coordinates_with_name() {
        let (resolver, geocoder, weather) = resolver(FakeGeocoder::austin());

        let resolution = resolver
            .resolve_location(LocationQuery::DeviceCoordinates(austin()))
            .await
            .unwrap();

        assert_eq!(resolution.place.city.as_deref(), Some("Austin"));
        assert_eq!(resolution.place.state.as_deref(), Some("TX"));
        assert_eq!(resolution.snapshot.display_name, "Austin, TX");
        assert_eq!(geocoder.reverse_calls.load(Ordering::SeqCst), 1);
        assert_eq!(weather.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.context().current(), Some(resolution));
    }

    #[tokio::test]
    async fn test_geocode_and_weather_run_concurrently() {
        let weather = Arc::new(FakeWeather::default());
        // reverse geocoding only returns once the weather fetch has started
        let geocoder = Arc::new(FakeGeocoder::austin().with_reverse_gate(weather.signal_fetches()));
        let resolver = LocationResolver::new(
            geocoder.clone(),
            weather.clone(),
            Arc::new(ResolutionContext::default()),
        );

        let resolution = tokio::time::timeout(
            Duration::from_secs(5),
            resolver.resolve_location(LocationQuery::DeviceCoordinates(austin())),
        )
        .await
        .expect("geocoding waited for weather instead of running alongside it")
        .unwrap();

        assert_eq!(resolution.snapshot.display_name, "Austin, TX");
        assert_eq!(geocoder.reverse_calls.load(Ordering::SeqCst), 1);
        assert_eq!(weather.calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[case(90.0, 180.0, false)]
    #[case(-90.0, -180.0, false)]
    #[case(0.0, 0.0, false)]
    #[case(-90.0, 180.0, false)]
    #[case(90.0, -180.0, false)]
    #[case(0.0, 180.0, false)]
    #[case(-90.0, 0.0, false)]
    #[case(90.0, 180.0, true)]
    #[case(0.0, 0.0, true)]
    #[case(-90.0, 180.0, true)]
    #[tokio::test]
    async fn test_any_valid_coordinates_resolve(
        #[case] lat: f64,
        #[case] lon: f64,
        #[case] weather_fails: bool,
    ) {
        let geocoder = FakeGeocoder::new(
            Err(PlacecastError::geocode_unavailable("ZERO_RESULTS")),
            Ok(vec![]),
        );
        let (resolver, _, weather) = resolver(geocoder);
        weather.set_failing(weather_fails);
        let coordinates = Coordinates::new(lat, lon).unwrap();

        let result = resolver
            .resolve_location(LocationQuery::DeviceCoordinates(coordinates))
            .await;

        if weather_fails {
            assert!(matches!(result, Err(PlacecastError::WeatherUnavailable { .. })));
            assert_eq!(resolver.context().current(), None);
        } else {
            let resolution = result.unwrap();
            assert_eq!(resolution.place.coordinates, coordinates);
            assert_eq!(resolution.snapshot.current.condition_code, 800);
            assert!(!resolution.snapshot.current.description.is_empty());
            assert_eq!(resolution.snapshot.display_name, coordinates.format_coordinates());
        }
    }

    #[tokio::test]
    async fn test_geocode_failure_degrades_to_coordinates() {
        let geocoder = FakeGeocoder::new(
            Err(PlacecastError::geocode_unavailable("REQUEST_DENIED")),
            Ok(vec![]),
        );
        let (resolver, _, _) = resolver(geocoder);

        let resolution = resolver
            .resolve_location(LocationQuery::DeviceCoordinates(austin()))
            .await
            .unwrap();

        assert_eq!(resolution.place.city, None);
        assert_eq!(resolution.snapshot.display_name, "30.2672, -97.7431");
        assert_eq!(resolver.context().phase(), ResolutionPhase::Resolved);
    }

    #[tokio::test]
    async fn test_country_only_name_falls_back_to_coordinates() {
        let geocoder = FakeGeocoder::new(
            Ok(PlaceName {
                country: "CA".to_string(),
                ..PlaceName::default()
            }),
            Ok(vec![]),
        );
        let (resolver, _, _) = resolver(geocoder);
        let coordinates = Coordinates::new(56.1304, -106.3468).unwrap();

        let resolution = resolver
            .resolve_location(LocationQuery::DeviceCoordinates(coordinates))
            .await
            .unwrap();

        assert_eq!(resolution.place.country, "CA");
        assert_eq!(resolution.snapshot.display_name, "56.1304, -106.3468");
    }

    #[tokio::test]
    async fn test_weather_failure_is_fatal_and_keeps_previous() {
        let (resolver, _, weather) = resolver(FakeGeocoder::austin());
        let previous = resolver
            .resolve_location(LocationQuery::DeviceCoordinates(austin()))
            .await
            .unwrap();

        weather.set_failing(true);
        let err = resolver
            .resolve_location(LocationQuery::DeviceCoordinates(boston()))
            .await
            .unwrap_err();

        assert!(matches!(err, PlacecastError::WeatherUnavailable { .. }));
        assert_eq!(resolver.context().current(), Some(previous));
        assert_eq!(
            resolver.context().phase(),
            ResolutionPhase::Failed { error: err }
        );
    }

    #[tokio::test]
    async fn test_text_query_uses_first_candidate() {
        let geocoder = FakeGeocoder::new(
            Ok(PlaceName::default()),
            Ok(vec![
                candidate("Boston", "MA", boston()),
                candidate("Austin", "TX", austin()),
            ]),
        );
        let (resolver, geocoder, _) = resolver(geocoder);

        let resolution = resolver
            .resolve_location(LocationQuery::text("Boston"))
            .await
            .unwrap();

        assert_eq!(resolution.place.coordinates, boston());
        assert_eq!(resolution.snapshot.display_name, "Boston, MA");
        assert_eq!(geocoder.reverse_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_text_query_not_found_keeps_previous() {
        let geocoder = FakeGeocoder::new(Ok(PlaceName::default()), Ok(vec![]));
        let (resolver, _, weather) = resolver(geocoder);
        let previous = resolver
            .resolve_location(LocationQuery::explicit("Austin", "TX", "US", 30.2672, -97.7431).unwrap())
            .await
            .unwrap();

        let err = resolver
            .resolve_location(LocationQuery::text("90210"))
            .await
            .unwrap_err();

        assert_eq!(err, PlacecastError::location_not_found("90210"));
        assert_eq!(err.user_message(), "Location not found.");
        assert_eq!(resolver.context().current(), Some(previous));
        assert_eq!(weather.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_text_query_is_rejected() {
        let (resolver, geocoder, weather) = resolver(FakeGeocoder::austin());

        let err = resolver
            .resolve_location(LocationQuery::text("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, PlacecastError::Validation { .. }));
        assert_eq!(geocoder.forward_calls.load(Ordering::SeqCst), 0);
        assert_eq!(weather.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_forward_geocode_failure_is_fatal() {
        let geocoder = FakeGeocoder::new(
            Ok(PlaceName::default()),
            Err(PlacecastError::geocode_transport("connection refused")),
        );
        let (resolver, _, weather) = resolver(geocoder);

        let err = resolver
            .resolve_location(LocationQuery::text("Austin"))
            .await
            .unwrap_err();

        assert!(err.is_geocode_failure());
        assert_eq!(weather.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_explicit_place_skips_geocoding() {
        let (resolver, geocoder, _) = resolver(FakeGeocoder::austin());

        let query = LocationQuery::explicit("Toronto", "ON", "CA", 43.6532, -79.3832).unwrap();
        let resolution = resolver.resolve_location(query).await.unwrap();

        assert_eq!(resolution.snapshot.display_name, "Toronto, ON, CA");
        assert_eq!(geocoder.reverse_calls.load(Ordering::SeqCst), 0);
        assert_eq!(geocoder.forward_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_superseded_resolution_is_discarded() {
        let (resolver, _, weather) = resolver(FakeGeocoder::austin());
        let release = weather.hold(austin());

        let slow = resolver.resolve_location(LocationQuery::DeviceCoordinates(austin()));
        let fast = async {
            let result = resolver
                .resolve_location(LocationQuery::explicit("Boston", "MA", "US", 42.3601, -71.0589).unwrap())
                .await;
            release.notify_one();
            result
        };

        let (slow, fast) = tokio::join!(slow, fast);

        assert!(matches!(slow, Err(PlacecastError::Superseded { .. })));
        let fast = fast.unwrap();
        assert_eq!(resolver.context().current(), Some(fast));
        assert_eq!(resolver.context().phase(), ResolutionPhase::Resolved);
    }

    #[tokio::test]
    async fn test_resolve_device() {
        let (resolver, _, _) = resolver(FakeGeocoder::austin());
        let locator = DeviceLocator::new(
            ConfiguredPosition::new(Some(austin())),
            PositionOptions::default(),
        );

        let resolution = resolver.resolve_device(&locator).await.unwrap();
        assert_eq!(resolution.snapshot.display_name, "Austin, TX");

        let err = resolver.resolve_device(&locator).await.unwrap_err();
        assert!(matches!(err, PlacecastError::GeolocationUnavailable { .. }));
        assert!(matches!(
            resolver.context().phase(),
            ResolutionPhase::Failed { .. }
        ));
        assert_eq!(resolver.context().current(), Some(resolution));
    }
}
