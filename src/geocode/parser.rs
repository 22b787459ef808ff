//! Classification of free-form location input

use crate::models::{Coordinates, LocationQuery};

/// ISO 3166-1 alpha-2 codes accepted as a postal-code prefix
const POSTAL_COUNTRIES: &[&str] = &[
    "AD", "AR", "AT", "AU", "BE", "BG", "BR", "CA", "CH", "CL", "CN", "CO", "CZ", "DE", "DK",
    "EE", "ES", "FI", "FR", "GB", "GR", "HR", "HU", "ID", "IE", "IL", "IN", "IS", "IT", "JP",
    "KR", "LI", "LT", "LU", "LV", "MC", "MX", "MY", "NL", "NO", "NZ", "PH", "PL", "PR", "PT",
    "RO", "RS", "RU", "SE", "SG", "SI", "SK", "TH", "TR", "TW", "UA", "US", "ZA",
];

/// What a piece of location text looks like
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedInput {
    /// "lat,lon" or "lat lon" within valid ranges
    Coordinates(Coordinates),
    /// Postal code, optionally with a two-letter country prefix
    PostalCode { code: String, country: Option<String> },
    /// Anything else: city, region, address
    Name(String),
}

/// Location input parsing utilities
pub struct QueryParser;

impl QueryParser {
    /// Classify input as coordinates, postal code or a place name
    #[must_use]
    pub fn parse(input: &str) -> ParsedInput {
        let input = input.trim();

        if let Some(coordinates) = Self::parse_coordinates(input) {
            return ParsedInput::Coordinates(coordinates);
        }

        if let Some((code, country)) = Self::parse_postal_code(input) {
            return ParsedInput::PostalCode { code, country };
        }

        ParsedInput::Name(input.to_string())
    }

    /// Turn CLI/search text into a query. Bare coordinates behave like a
    /// device fix; everything else goes through forward geocoding.
    #[must_use]
    pub fn to_query(input: &str) -> LocationQuery {
        match Self::parse(input) {
            ParsedInput::Coordinates(coordinates) => LocationQuery::DeviceCoordinates(coordinates),
            _ => LocationQuery::text(input.trim()),
        }
    }

    /// Parse coordinates from strings like "46.8182,8.2275" or "46.8182 8.2275"
    fn parse_coordinates(input: &str) -> Option<Coordinates> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        if parts.len() != 2 {
            return None;
        }

        let lat = parts[0].parse::<f64>().ok()?;
        let lon = parts[1].parse::<f64>().ok()?;
        Coordinates::new(lat, lon).ok()
    }

    /// Check if input looks like a postal code
    #[must_use]
    pub fn is_postal_code(input: &str) -> bool {
        Self::parse_postal_code(input).is_some()
    }

    fn parse_postal_code(input: &str) -> Option<(String, Option<String>)> {
        let normalized = input.replace([' ', '-'], "");

        // US ZIP codes: 5 or 9 digits; ZIP+4 is looked up by its first five
        if (normalized.len() == 5 || normalized.len() == 9)
            && normalized.chars().all(|c| c.is_ascii_digit())
        {
            return Some((normalized[..5].to_string(), None));
        }

        // International postal codes: known country code, then a code starting with a digit
        if normalized.len() >= 5 && normalized.len() <= 10 && normalized.is_ascii() {
            let (prefix, suffix) = normalized.split_at(2);
            let prefix = prefix.to_ascii_uppercase();
            if POSTAL_COUNTRIES.contains(&prefix.as_str())
                && suffix.len() >= 3
                && suffix.starts_with(|c: char| c.is_ascii_digit())
                && suffix.chars().all(|c| c.is_ascii_alphanumeric())
                && suffix.chars().any(|c| c.is_ascii_digit())
            {
                return Some((suffix.to_string(), Some(prefix)));
            }
        }

        None
    }
}
