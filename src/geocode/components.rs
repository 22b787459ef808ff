//! Address component selection for reverse-geocode results

use serde::{Deserialize, Serialize};

use super::PlaceName;
use crate::models::DEFAULT_COUNTRY;

/// City component types, highest priority first
const CITY_TYPES: [&str; 4] = [
    "postal_town",
    "sublocality_level_1",
    "locality",
    "neighborhood",
];

/// One entry of `results[].address_components`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressComponent {
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

fn find<'a>(components: &'a [AddressComponent], kind: &str) -> Option<&'a AddressComponent> {
    components.iter().find(|c| c.has_type(kind))
}

/// Pick city, state, country and postal code from a result's components.
///
/// The city is the first component matching `postal_town`, then
/// `sublocality_level_1`, `locality`, `neighborhood`. State and country use the
/// abbreviated `short_name`. Missing parts are empty, country falls back to `"US"`.
#[must_use]
pub fn select_place_name(components: &[AddressComponent]) -> PlaceName {
    let city = CITY_TYPES
        .iter()
        .find_map(|kind| find(components, kind))
        .map(|c| c.long_name.clone())
        .unwrap_or_default();

    let state = find(components, "administrative_area_level_1")
        .map(|c| c.short_name.clone())
        .unwrap_or_default();

    let country = find(components, "country")
        .map(|c| c.short_name.clone())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

    let zip = find(components, "postal_code")
        .map(|c| c.long_name.clone())
        .unwrap_or_default();

    PlaceName {
        city,
        state,
        country,
        zip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(types: &[&str], long_name: &str, short_name: &str) -> AddressComponent {
        AddressComponent {
            long_name: long_name.to_string(),
            short_name: short_name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_austin_components() {
        let components = vec![
            component(&["locality", "political"], "Austin", "Austin"),
            component(&["administrative_area_level_1", "political"], "Texas", "TX"),
            component(&["country", "political"], "United States", "US"),
        ];

        let name = select_place_name(&components);
        assert_eq!(name.city, "Austin");
        assert_eq!(name.state, "TX");
        assert_eq!(name.country, "US");
        assert_eq!(name.zip, "");
    }

    #[test]
    fn test_postal_town_beats_locality() {
        let components = vec![
            component(&["locality"], "Westminster", "Westminster"),
            component(&["postal_town"], "London", "London"),
            component(&["country"], "United Kingdom", "GB"),
            component(&["postal_code"], "SW1A 1AA", "SW1A 1AA"),
        ];

        let name = select_place_name(&components);
        assert_eq!(name.city, "London");
        assert_eq!(name.country, "GB");
        assert_eq!(name.zip, "SW1A 1AA");
    }

    #[test]
    fn test_sublocality_beats_locality_and_neighborhood() {
        let components = vec![
            component(&["neighborhood"], "Williamsburg", "Williamsburg"),
            component(&["locality"], "New York", "New York"),
            component(&["sublocality_level_1", "sublocality"], "Brooklyn", "Brooklyn"),
        ];

        assert_eq!(select_place_name(&components).city, "Brooklyn");
    }

    #[test]
    fn test_neighborhood_is_last_resort() {
        let components = vec![component(&["neighborhood"], "Hyde Park", "Hyde Park")];
        assert_eq!(select_place_name(&components).city, "Hyde Park");
    }

    #[test]
    fn test_missing_components_are_empty() {
        let name = select_place_name(&[]);
        assert_eq!(name, PlaceName::default());
    }

    #[test]
    fn test_country_only() {
        let components = vec![component(&["country", "political"], "Canada", "CA")];
        let name = select_place_name(&components);
        assert_eq!(name.city, "");
        assert_eq!(name.state, "");
        assert_eq!(name.country, "CA");
    }
}
