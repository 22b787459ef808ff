//! In-memory adapters and fixtures for unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::Notify;

use crate::geocode::{Geocoder, PlaceCandidate, PlaceName};
use crate::models::{
    Coordinates, CurrentConditions, DayPoint, Resolution, ResolvedPlace, UnitSystem,
    WeatherSnapshot,
};
use crate::weather::{WeatherPayload, WeatherSource};
use crate::{PlacecastError, Result};

pub fn austin() -> Coordinates {
    Coordinates::new(30.2672, -97.7431).unwrap()
}

pub fn boston() -> Coordinates {
    Coordinates::new(42.3601, -71.0589).unwrap()
}

/// Payload whose numbers depend on the unit system, like the real provider's
pub fn sample_payload(units: UnitSystem) -> WeatherPayload {
    let (temp, feels_like, wind_speed) = match units {
        UnitSystem::Imperial => (72.0, 71.0, 10.0),
        UnitSystem::Metric => (22.2, 21.7, 4.47),
    };
    WeatherPayload {
        units,
        timezone_offset: -18000,
        current: CurrentConditions {
            dt: 1_718_900_000,
            temp,
            feels_like,
            pressure: 1015.0,
            humidity: 40.0,
            visibility: Some(10000.0),
            wind_speed,
            wind_deg: Some(180.0),
            condition_code: 800,
            description: "clear sky".to_string(),
            icon: Some("01d".to_string()),
            sunrise: 1_718_882_000,
            sunset: 1_718_933_000,
        },
        dew_point: Some(50.0),
        uv_index: Some(6.0),
        moon_phase: Some(0.5),
        hourly: vec![],
        daily: vec![DayPoint {
            dt: 1_718_906_400,
            sunrise: Some(1_718_882_000),
            sunset: Some(1_718_933_000),
            temp_min: temp - 10.0,
            temp_max: temp + 5.0,
            humidity: 45.0,
            wind_speed,
            wind_deg: Some(180.0),
            pop: 0.1,
            moon_phase: Some(0.5),
            condition_code: 800,
            description: "clear sky".to_string(),
            icon: Some("01d".to_string()),
        }],
    }
}

pub fn sample_resolution(city: &str) -> Resolution {
    let place = ResolvedPlace::from_parts(austin(), city, "TX", "US", "");
    let payload = sample_payload(UnitSystem::Imperial);
    Resolution {
        snapshot: WeatherSnapshot {
            units: UnitSystem::Imperial,
            is_night: false,
            local_time_label: "3:07 PM".to_string(),
            utc_offset_seconds: payload.timezone_offset,
            dew_point: payload.dew_point,
            uv_index: payload.uv_index,
            moon_phase: payload.moon_phase,
            hourly: payload.hourly,
            daily: payload.daily,
            display_name: place.display_name(),
            fetched_at: Utc::now(),
            current: payload.current,
        },
        place,
    }
}

pub fn candidate(name: &str, state: &str, coordinates: Coordinates) -> PlaceCandidate {
    PlaceCandidate {
        name: name.to_string(),
        state: Some(state.to_string()),
        country: "US".to_string(),
        zip: None,
        coordinates,
    }
}

/// Geocoder answering from fixed results, optionally holding reverse lookups
/// until a signal arrives
#[derive(Debug)]
pub struct FakeGeocoder {
    pub reverse: Result<PlaceName>,
    pub forward: Result<Vec<PlaceCandidate>>,
    pub reverse_calls: AtomicUsize,
    pub forward_calls: AtomicUsize,
    pub reverse_gate: Option<Arc<Notify>>,
}

impl FakeGeocoder {
    pub fn new(reverse: Result<PlaceName>, forward: Result<Vec<PlaceCandidate>>) -> Self {
        Self {
            reverse,
            forward,
            reverse_calls: AtomicUsize::new(0),
            forward_calls: AtomicUsize::new(0),
            reverse_gate: None,
        }
    }

    /// Reverse lookups wait until `gate` is notified
    pub fn with_reverse_gate(mut self, gate: Arc<Notify>) -> Self {
        self.reverse_gate = Some(gate);
        self
    }

    pub fn austin() -> Self {
        Self::new(
            Ok(PlaceName {
                city: "Austin".to_string(),
                state: "TX".to_string(),
                country: "US".to_string(),
                zip: "78701".to_string(),
            }),
            Ok(vec![candidate("Austin", "TX", austin())]),
        )
    }
}

impl Geocoder for FakeGeocoder {
    async fn reverse_geocode(&self, _coordinates: Coordinates) -> Result<PlaceName> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.reverse_gate {
            gate.notified().await;
        }
        self.reverse.clone()
    }

    async fn forward_geocode(&self, _text: &str, _units: UnitSystem) -> Result<Vec<PlaceCandidate>> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);
        self.forward.clone()
    }
}

/// Weather source serving [`sample_payload`], optionally failing or holding
/// the next fetch for one latitude until released
#[derive(Debug, Default)]
pub struct FakeWeather {
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
    pub gate: Mutex<Option<(f64, Arc<Notify>)>>,
    pub started: Mutex<Option<Arc<Notify>>>,
    pub fail_lat: Mutex<Option<f64>>,
}

impl FakeWeather {
    /// Hold the next fetch for `coordinates` until the returned handle is notified
    pub fn hold(&self, coordinates: Coordinates) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some((coordinates.lat, notify.clone()));
        notify
    }

    /// Returned handle is notified whenever a fetch starts
    pub fn signal_fetches(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.started.lock().unwrap() = Some(notify.clone());
        notify
    }

    /// Fail every fetch for `coordinates`
    pub fn fail_at(&self, coordinates: Coordinates) {
        *self.fail_lat.lock().unwrap() = Some(coordinates.lat);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl WeatherSource for FakeWeather {
    async fn fetch(&self, coordinates: Coordinates, units: UnitSystem) -> Result<WeatherPayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(started) = self.started.lock().unwrap().as_ref() {
            started.notify_one();
        }

        let gate = {
            let mut gate = self.gate.lock().unwrap();
            match gate.as_ref() {
                Some((lat, _)) if *lat == coordinates.lat => gate.take().map(|(_, notify)| notify),
                _ => None,
            }
        };
        if let Some(notify) = gate {
            notify.notified().await;
        }

        let failing_here = *self.fail_lat.lock().unwrap() == Some(coordinates.lat);
        if failing_here || self.fail.load(Ordering::SeqCst) {
            return Err(PlacecastError::weather_unavailable("HTTP 500"));
        }
        Ok(sample_payload(units))
    }
}
