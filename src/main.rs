use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use placecast::geocode::QueryParser;
use placecast::presentation::render_summary;
use placecast::{
    ConfiguredPosition, DeviceLocator, GoogleGeocodingClient, HttpGeocoder, LocationQuery,
    LocationResolver, OpenWeatherClient, PlacecastConfig, PositionOptions, ResolutionContext,
    UnitSystem, UnitsController, telemetry, web,
};

const HOURLY_ENTRIES: usize = 12;

#[derive(Parser)]
#[command(author, version, about = "Resolve a location and show its weather")]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a location and print its weather
    Weather {
        /// City, "city, state", postal code or "lat,lon"
        #[arg(short, long, conflicts_with_all = ["lat", "lon"])]
        location: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// imperial or metric (defaults to the configured unit system)
        #[arg(short, long)]
        units: Option<UnitSystem>,

        /// Switch units after resolving and print the refreshed weather
        #[arg(short, long)]
        toggle: bool,
    },

    /// Run the reverse-geocode proxy endpoint
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = PlacecastConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    telemetry::init(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Weather {
            location,
            lat,
            lon,
            units,
            toggle,
        } => {
            let query = match (location, lat, lon) {
                (Some(text), _, _) => Some(QueryParser::to_query(&text)),
                (None, Some(lat), Some(lon)) => Some(LocationQuery::device(lat, lon)?),
                _ => None,
            };
            weather(&config, query, units, toggle).await
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let client = GoogleGeocodingClient::from_config(&config)?;
            web::run(port, client).await
        }
    }
}

async fn weather(
    config: &PlacecastConfig,
    query: Option<LocationQuery>,
    units: Option<UnitSystem>,
    toggle: bool,
) -> Result<()> {
    let weather = Arc::new(OpenWeatherClient::from_config(config)?);
    let geocoder = HttpGeocoder::from_config(config)?;
    let context = Arc::new(ResolutionContext::new(units.unwrap_or(config.defaults.units)));

    let resolver = LocationResolver::new(geocoder, weather.clone(), context.clone());
    let controller = UnitsController::new(weather, context);

    let outcome = match query {
        Some(query) => resolver.resolve_location(query).await,
        None => {
            info!("No location given, using device geolocation");
            let locator = DeviceLocator::new(
                ConfiguredPosition::from_config(&config.device)?,
                PositionOptions::from_config(&config.defaults),
            );
            resolver.resolve_device(&locator).await
        }
    };

    let resolution = match outcome {
        Ok(resolution) => resolution,
        Err(e) => bail!("{} ({})", e.user_message(), e),
    };
    println!("{}", render_summary(&resolution, HOURLY_ENTRIES));

    if toggle {
        let result = controller.toggle().await;
        if let Some(e) = result.error {
            eprintln!("Units switched to {}, but: {}", result.units, e.user_message());
        }
        if let Some(current) = resolver.context().current() {
            println!("{}", render_summary(&current, HOURLY_ENTRIES));
        }
    }

    Ok(())
}
