//! Unit system selection

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PlacecastError;

/// Measurement system requested from the weather provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

impl UnitSystem {
    /// The other unit system
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Imperial => Self::Metric,
            Self::Metric => Self::Imperial,
        }
    }

    /// Value of the provider's `units` query parameter
    #[must_use]
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Imperial => "imperial",
            Self::Metric => "metric",
        }
    }

    #[must_use]
    pub fn temperature_symbol(self) -> &'static str {
        match self {
            Self::Imperial => "°F",
            Self::Metric => "°C",
        }
    }

    /// Unit of the provider's wind speed in this system
    #[must_use]
    pub fn wind_speed_unit(self) -> &'static str {
        match self {
            Self::Imperial => "mph",
            Self::Metric => "m/s",
        }
    }
}

impl Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for UnitSystem {
    type Err = PlacecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "imperial" | "f" | "fahrenheit" => Ok(Self::Imperial),
            "metric" | "c" | "celsius" => Ok(Self::Metric),
            other => Err(PlacecastError::validation(format!(
                "Unknown unit system '{other}'. Must be one of: imperial, metric"
            ))),
        }
    }
}
