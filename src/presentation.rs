//! Text formatting of resolved places and weather snapshots
//!
//! Nothing here is stored: state/country expansion and unit conversions are
//! applied when a snapshot is turned into text.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset};

use crate::aggregator::local_time_label;
use crate::models::{DEFAULT_COUNTRY, Resolution, ResolvedPlace, UnitSystem};

const METERS_TO_MILES: f64 = 0.000621371;

/// Lower-cased US state names and their postal abbreviations
const STATE_LOOKUP: &[(&str, &str)] = &[
    ("alabama", "AL"),
    ("alaska", "AK"),
    ("arizona", "AZ"),
    ("arkansas", "AR"),
    ("california", "CA"),
    ("colorado", "CO"),
    ("connecticut", "CT"),
    ("delaware", "DE"),
    ("florida", "FL"),
    ("georgia", "GA"),
    ("hawaii", "HI"),
    ("idaho", "ID"),
    ("illinois", "IL"),
    ("indiana", "IN"),
    ("iowa", "IA"),
    ("kansas", "KS"),
    ("kentucky", "KY"),
    ("louisiana", "LA"),
    ("maine", "ME"),
    ("maryland", "MD"),
    ("massachusetts", "MA"),
    ("michigan", "MI"),
    ("minnesota", "MN"),
    ("mississippi", "MS"),
    ("missouri", "MO"),
    ("montana", "MT"),
    ("nebraska", "NE"),
    ("nevada", "NV"),
    ("new hampshire", "NH"),
    ("new jersey", "NJ"),
    ("new mexico", "NM"),
    ("new york", "NY"),
    ("north carolina", "NC"),
    ("north dakota", "ND"),
    ("ohio", "OH"),
    ("oklahoma", "OK"),
    ("oregon", "OR"),
    ("pennsylvania", "PA"),
    ("rhode island", "RI"),
    ("south carolina", "SC"),
    ("south dakota", "SD"),
    ("tennessee", "TN"),
    ("texas", "TX"),
    ("utah", "UT"),
    ("vermont", "VT"),
    ("virginia", "VA"),
    ("washington", "WA"),
    ("west virginia", "WV"),
    ("wisconsin", "WI"),
    ("wyoming", "WY"),
];

const COUNTRY_LOOKUP: &[(&str, &str)] = &[
    ("IE", "Ireland"),
    ("CA", "Canada"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("IN", "India"),
    ("AU", "Australia"),
    ("MX", "Mexico"),
    ("BR", "Brazil"),
    ("JP", "Japan"),
    ("CN", "China"),
    ("IT", "Italy"),
    ("ES", "Spain"),
    ("SE", "Sweden"),
    ("NO", "Norway"),
    ("NZ", "New Zealand"),
];

/// Full US state names become their abbreviation; anything else is kept
#[must_use]
pub fn state_label(state: &str) -> &str {
    let key = state.to_lowercase();
    STATE_LOOKUP
        .iter()
        .find(|(name, _)| *name == key)
        .map_or(state, |(_, code)| *code)
}

/// Known country codes become their English name; anything else is kept
#[must_use]
pub fn country_label(country: &str) -> &str {
    COUNTRY_LOOKUP
        .iter()
        .find(|(code, _)| *code == country)
        .map_or(country, |(_, name)| *name)
}

/// Display name with state and country expanded, same fallbacks as
/// [`ResolvedPlace::display_name`]
#[must_use]
pub fn full_display_name(place: &ResolvedPlace) -> String {
    let Some(city) = &place.city else {
        return place.display_name();
    };

    let mut name = city.clone();
    if let Some(state) = &place.state {
        name.push_str(", ");
        name.push_str(state_label(state));
    }
    if place.country != DEFAULT_COUNTRY {
        name.push_str(", ");
        name.push_str(country_label(&place.country));
    }
    name
}

/// Visibility from provider meters: miles for imperial, kilometers for metric
#[must_use]
pub fn format_visibility(meters: Option<f64>, units: UnitSystem) -> String {
    match (meters, units) {
        (None, _) => "N/A".to_string(),
        (Some(m), UnitSystem::Imperial) => format!("{:.1} mi", m * METERS_TO_MILES),
        (Some(m), UnitSystem::Metric) => format!("{:.1} km", m / 1000.0),
    }
}

#[must_use]
pub fn format_temperature(value: f64) -> String {
    format!("{}°", value.round())
}

#[must_use]
pub fn format_optional_temperature(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), format_temperature)
}

#[must_use]
pub fn format_wind(speed: f64, degrees: Option<f64>, units: UnitSystem) -> String {
    match degrees {
        Some(deg) if deg != 0.0 => format!("{} {} from {}°", speed, units.wind_speed_unit(), deg),
        _ => format!("{} {}", speed, units.wind_speed_unit()),
    }
}

/// "Now" for the first hourly entry, then the local hour ("3 PM")
#[must_use]
pub fn hour_label(index: usize, dt: i64, offset_seconds: i32) -> String {
    if index == 0 {
        return "Now".to_string();
    }
    let Some(offset) = FixedOffset::east_opt(offset_seconds) else {
        return String::new();
    };
    DateTime::from_timestamp(dt, 0)
        .map(|utc| utc.with_timezone(&offset).format("%-I %p").to_string())
        .unwrap_or_default()
}

/// Upper-case the first letter of a provider description
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Multi-line text summary of a resolution
#[must_use]
pub fn render_summary(resolution: &Resolution, hours: usize) -> String {
    let snapshot = &resolution.snapshot;
    let current = &snapshot.current;
    let units = snapshot.units;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} (as of {})",
        full_display_name(&resolution.place),
        snapshot.local_time_label
    );
    let _ = writeln!(
        out,
        "{}{} {}",
        current.temp.round(),
        units.temperature_symbol(),
        capitalize(&current.description)
    );
    let _ = writeln!(out, "Feels like: {}", format_temperature(current.feels_like));
    if let Some((min, max)) = snapshot.today_range() {
        let _ = writeln!(out, "High/Low: {}/{}", format_temperature(max), format_temperature(min));
    }
    let _ = writeln!(out, "Humidity: {}%", current.humidity);
    let _ = writeln!(out, "Dew point: {}", format_optional_temperature(snapshot.dew_point));
    let _ = writeln!(
        out,
        "UV index: {}",
        snapshot
            .uv_index
            .map_or_else(|| "N/A".to_string(), |uvi| uvi.to_string())
    );
    let _ = writeln!(out, "Wind: {}", format_wind(current.wind_speed, current.wind_deg, units));
    let _ = writeln!(out, "Pressure: {} hPa", current.pressure);
    let _ = writeln!(out, "Visibility: {}", format_visibility(current.visibility, units));
    let _ = writeln!(
        out,
        "Sunrise: {}  Sunset: {}",
        local_time_label(current.sunrise, snapshot.utc_offset_seconds),
        local_time_label(current.sunset, snapshot.utc_offset_seconds)
    );
    let _ = writeln!(out, "{}", if snapshot.is_night { "Night" } else { "Day" });

    if !snapshot.hourly.is_empty() && hours > 0 {
        let line = snapshot
            .hourly
            .iter()
            .take(hours)
            .enumerate()
            .map(|(i, hour)| {
                format!(
                    "{} {}",
                    hour_label(i, hour.dt, snapshot.utc_offset_seconds),
                    format_temperature(hour.temp)
                )
            })
            .collect::<Vec<_>>()
            .join(" | ");
        let _ = writeln!(out, "Hourly: {line}");
    }

    for day in &snapshot.daily {
        let date = DateTime::from_timestamp(day.dt + i64::from(snapshot.utc_offset_seconds), 0)
            .map(|d| d.format("%a %b %-d").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {date}: {}/{} {}",
            format_temperature(day.temp_max),
            format_temperature(day.temp_min),
            capitalize(&day.description)
        );
    }

    out
}
