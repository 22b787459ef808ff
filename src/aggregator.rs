//! Merging provider payloads into a weather snapshot

use chrono::{DateTime, FixedOffset, Offset, Utc};
use tracing::{debug, warn};

use crate::models::{ResolvedPlace, UnitSystem, WeatherSnapshot};
use crate::weather::WeatherPayload;

/// Combines a validated weather payload and a resolved place into the
/// snapshot consumers observe
pub struct WeatherAggregator;

impl WeatherAggregator {
    #[must_use]
    pub fn aggregate(payload: WeatherPayload, place: &ResolvedPlace, units: UnitSystem) -> WeatherSnapshot {
        let current = payload.current;
        let is_night = is_night(current.dt, current.sunrise, current.sunset);
        let local_time_label = local_time_label(current.dt, payload.timezone_offset);

        if current.sunrise == 0 || current.sunset == 0 {
            warn!("Provider omitted sunrise/sunset, treating missing values as 0");
        }
        debug!(
            "Aggregated snapshot for {}: {} at {}, night={}",
            place.display_name(),
            current.description,
            local_time_label,
            is_night
        );

        WeatherSnapshot {
            units,
            is_night,
            local_time_label,
            utc_offset_seconds: payload.timezone_offset,
            dew_point: payload.dew_point,
            uv_index: payload.uv_index,
            moon_phase: payload.moon_phase,
            hourly: payload.hourly,
            daily: payload.daily,
            display_name: place.display_name(),
            fetched_at: Utc::now(),
            current,
        }
    }
}

/// Night when the observation is before sunrise or after sunset.
///
/// A missing sunrise/sunset arrives here as `0`, which makes almost every
/// observation count as night.
#[must_use]
pub fn is_night(dt: i64, sunrise: i64, sunset: i64) -> bool {
    dt < sunrise || dt > sunset
}

/// `h:mm AM/PM` of a Unix timestamp in a place `offset_seconds` away from UTC
#[must_use]
pub fn local_time_label(dt: i64, offset_seconds: i32) -> String {
    let offset = FixedOffset::east_opt(offset_seconds).unwrap_or_else(|| {
        warn!("Invalid UTC offset {}s, using UTC", offset_seconds);
        Utc.fix()
    });

    match DateTime::from_timestamp(dt, 0) {
        Some(utc) => utc.with_timezone(&offset).format("%-I:%M %p").to_string(),
        None => {
            warn!("Observation time {} out of range", dt);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, CurrentConditions};
    use rstest::rstest;

    fn payload(dt: i64, sunrise: i64, sunset: i64) -> WeatherPayload {
        WeatherPayload {
            units: UnitSystem::Imperial,
            timezone_offset: -18000,
            current: CurrentConditions {
                dt,
                temp: 72.0,
                feels_like: 71.0,
                pressure: 1015.0,
                humidity: 40.0,
                visibility: Some(10000.0),
                wind_speed: 5.0,
                wind_deg: Some(90.0),
                condition_code: 800,
                description: "clear sky".to_string(),
                icon: Some("01d".to_string()),
                sunrise,
                sunset,
            },
            dew_point: Some(50.0),
            uv_index: Some(3.0),
            moon_phase: Some(0.25),
            hourly: vec![],
            daily: vec![],
        }
    }

    #[rstest]
    #[case(1_000, 500, 2_000, false)]
    #[case(400, 500, 2_000, true)]
    #[case(2_500, 500, 2_000, true)]
    #[case(500, 500, 2_000, false)]
    #[case(2_000, 500, 2_000, false)]
    #[case(1_718_900_000, 0, 0, true)]
    fn test_is_night(#[case] dt: i64, #[case] sunrise: i64, #[case] sunset: i64, #[case] expected: bool) {
        assert_eq!(is_night(dt, sunrise, sunset), expected);
    }

    #[rstest]
    #[case(0, 0, "12:00 AM")]
    #[case(15 * 3600 + 7 * 60, 0, "3:07 PM")]
    #[case(15 * 3600 + 7 * 60, -5 * 3600, "10:07 AM")]
    #[case(23 * 3600 + 30 * 60, 5 * 3600 + 1800, "5:00 AM")]
    fn test_local_time_label(#[case] dt: i64, #[case] offset: i32, #[case] expected: &str) {
        assert_eq!(local_time_label(dt, offset), expected);
    }

    #[test]
    fn test_aggregate_copies_payload_and_place() {
        let coordinates = Coordinates::new(30.2672, -97.7431).unwrap();
        let place = ResolvedPlace::from_parts(coordinates, "Austin", "TX", "US", "78701");

        let snapshot = WeatherAggregator::aggregate(payload(1_000, 500, 2_000), &place, UnitSystem::Imperial);

        assert_eq!(snapshot.display_name, "Austin, TX");
        assert!(!snapshot.is_night);
        assert_eq!(snapshot.utc_offset_seconds, -18000);
        assert_eq!(snapshot.current.temp, 72.0);
        assert_eq!(snapshot.dew_point, Some(50.0));
        assert_eq!(snapshot.moon_phase, Some(0.25));
        assert_eq!(snapshot.units, UnitSystem::Imperial);
    }

    #[test]
    fn test_aggregate_unnamed_place_uses_coordinates() {
        let coordinates = Coordinates::new(51.5, -0.12).unwrap();
        let place = ResolvedPlace::unnamed(coordinates);

        let snapshot = WeatherAggregator::aggregate(payload(1_000, 0, 0), &place, UnitSystem::Metric);

        assert_eq!(snapshot.display_name, "51.5000, -0.1200");
        assert!(snapshot.is_night);
    }
}
