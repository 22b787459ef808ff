use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api;
use crate::geocode::GoogleGeocodingClient;

pub fn app(client: Arc<GoogleGeocodingClient>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new().nest("/api", api::router(client)).layer(cors)
}

pub async fn run(port: u16, client: GoogleGeocodingClient) -> Result<()> {
    let app = app(Arc::new(client));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Reverse geocode proxy running at http://localhost:{}/api/reverse-geocode", port);
    axum::serve(listener, app).await.context("Web server stopped")?;
    Ok(())
}
