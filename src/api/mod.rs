use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::geocode::GoogleGeocodingClient;
use crate::{PlacecastError, models::Coordinates};

/// Raw query parameters; parsed by the handler so that missing and
/// malformed values get distinct responses
#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

pub fn router(client: Arc<GoogleGeocodingClient>) -> Router {
    Router::new()
        .route("/reverse-geocode", get(reverse_geocode))
        .with_state(client)
}

fn error_response(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}

fn parse_coordinate(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

async fn reverse_geocode(
    State(client): State<Arc<GoogleGeocodingClient>>,
    Query(params): Query<ReverseGeocodeParams>,
) -> Response {
    let (Some(lat), Some(lon)) = (
        params.lat.filter(|v| !v.trim().is_empty()),
        params.lon.filter(|v| !v.trim().is_empty()),
    ) else {
        return error_response(StatusCode::BAD_REQUEST, json!({"error": "Missing lat/lon"}));
    };

    let coordinates = match (parse_coordinate(&lat), parse_coordinate(&lon)) {
        (Some(lat), Some(lon)) => Coordinates::new(lat, lon).ok(),
        _ => None,
    };
    let Some(coordinates) = coordinates else {
        return error_response(StatusCode::BAD_REQUEST, json!({"error": "Invalid lat/lon"}));
    };

    info!("Reverse geocode proxy request for {}", coordinates.format_coordinates());
    match client.reverse_geocode_raw(coordinates.lat, coordinates.lon).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            error!("Reverse geocode proxy failed: {}", e);
            let details = match e {
                PlacecastError::GeocodeUnavailable { details }
                | PlacecastError::GeocodeTransport { details } => details,
                other => other.to_string(),
            };
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                json!({"error": "Geocoding service unavailable", "details": details}),
            )
        }
    }
}
