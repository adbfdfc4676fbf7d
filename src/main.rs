use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use store_router::config::Config;
use store_router::models::{Coordinate, Registry};
use store_router::planner::{NearbyStores, PlannedRoute, RoutePlanner};
use store_router::utils::geocoding::{
    FixedGateway, GeocodingGateway, NominatimGateway, NominatimGatewayParams,
};
use store_router::utils::init_map::GraphBuilder;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON store registry (defaults to STORE_REGISTRY or the built-in stores)
    #[arg(short, long, global = true)]
    registry: Option<PathBuf>,

    /// Geocoding timeout in seconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    /// Upper bound for a whole request, in seconds
    #[arg(long, global = true, default_value_t = 30)]
    plan_timeout: u64,

    /// Known origin latitude; skips remote geocoding together with --origin-lon
    #[arg(long, global = true, requires = "origin_lon", allow_hyphen_values = true)]
    origin_lat: Option<f64>,

    #[arg(long, global = true, requires = "origin_lat", allow_hyphen_values = true)]
    origin_lon: Option<f64>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Distance from an address to every store
    Nearby {
        #[arg(short, long)]
        address: String,
    },
    /// Plan a visiting route over a set of stores
    Route {
        #[arg(short, long)]
        address: String,

        /// Starting point (defaults to the origin)
        #[arg(short, long)]
        start: Option<String>,

        /// Store to visit; repeat for each store
        #[arg(short, long = "visit", required = true)]
        visits: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .init();

    let config = Config::from_env()?.with_overrides(cli.registry.clone(), cli.timeout);

    let registry = match &config.registry_path {
        Some(path) => Registry::from_path(path)
            .with_context(|| format!("loading registry {}", path.display()))?,
        None => Registry::default_stores(),
    };
    info!("Loaded {} stores", registry.len());

    let gateway: Arc<dyn GeocodingGateway> = match (cli.origin_lat, cli.origin_lon) {
        (Some(lat), Some(lon)) => {
            let origin = Coordinate::new(lat, lon);
            anyhow::ensure!(origin.is_valid(), "origin coordinate out of range");
            Arc::new(FixedGateway::always(origin))
        }
        _ => Arc::new(NominatimGateway::new(NominatimGatewayParams {
            base_url: config.nominatim_url.clone(),
            user_agent: config.user_agent.clone(),
        })),
    };

    let builder = GraphBuilder::new(config.origin_name.clone(), config.geocode_timeout);
    let planner = RoutePlanner::new(gateway, registry, builder)
        .with_plan_timeout(Duration::from_secs(cli.plan_timeout.max(1)));

    match cli.command {
        Commands::Nearby { address } => {
            let nearby = planner.nearby_stores(&address).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&nearby)?);
            } else {
                print_nearby(&nearby);
            }
        }
        Commands::Route {
            address,
            start,
            visits,
        } => {
            let planned = planner
                .plan_route(&address, start.as_deref(), &visits)
                .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&planned)?);
            } else {
                print_route(&planned);
            }
        }
    }

    Ok(())
}

fn print_nearby(nearby: &NearbyStores) {
    println!(
        "Origin at ({:.5}, {:.5})",
        nearby.origin.latitude, nearby.origin.longitude
    );
    for entry in &nearby.distances {
        println!(
            "  {:<28} {:>8.2} km  {}",
            entry.name, entry.distance_km, entry.address
        );
    }
}

fn print_route(planned: &PlannedRoute) {
    if planned.route.is_empty() {
        println!("Nothing to visit");
        return;
    }

    for (i, leg) in planned.route.legs.iter().enumerate() {
        println!(
            "{:>3}. {} -> {}: {:.2} km",
            i + 1,
            leg.from,
            leg.to,
            leg.distance_km
        );
        println!("     {} -> {}", leg.from_address, leg.to_address);
    }
    println!("Total distance: {:.2} km", planned.route.total_km);
}
