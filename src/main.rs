//! # osrm-bridge CLI
//!
//! Command-line front end to the osrm-bridge library, for ad hoc table,
//! route and trip queries against a local OSRM dataset.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use osrm_bridge::{
    Algorithm, EngineConfig, OsrmEngine, Point, RouteRequest, TableRequest, TripRequest,
};

/// Command-line interface for osrm-bridge
#[derive(Parser, Debug)]
#[command(name = "osrm-bridge")]
#[command(about = "Query an OSRM dataset through the osrm-bridge library")]
#[command(long_about = "Runs OSRM table, route and trip queries against a local dataset:
  osrm-bridge --data monaco.osrm route 7.4266,43.7397 7.4209,43.7351
  osrm-bridge --data monaco.osrm table --sources 0 7.42,43.73 7.43,43.74 7.41,43.72
  osrm-bridge --data monaco.osrm --algorithm CH trip 7.42,43.73 7.43,43.74 7.41,43.72

Coordinates are written lon,lat and come after every option. The dataset and
algorithm can also be set with OSRM_DATA_PATH and OSRM_ALGORITHM.")]
#[command(version = env!("OSRM_BRIDGE_VERSION"))]
struct Cli {
    /// Base path of the preprocessed dataset (e.g. monaco-latest.osrm)
    #[arg(long, env = "OSRM_DATA_PATH", global = true)]
    data: Option<PathBuf>,

    /// Routing algorithm the dataset was prepared for: CH or MLD
    #[arg(long, env = "OSRM_ALGORITHM", default_value = "MLD", global = true)]
    algorithm: Algorithm,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Duration matrix between coordinates
    Table {
        #[arg(required = true, allow_hyphen_values = true)]
        coordinates: Vec<Point>,

        /// Indices of the coordinates used as sources (default: all)
        #[arg(long, value_delimiter = ',')]
        sources: Vec<usize>,

        /// Indices of the coordinates used as destinations (default: all)
        #[arg(long, value_delimiter = ',')]
        destinations: Vec<usize>,
    },

    /// Fastest route through the coordinates, in order
    Route {
        #[arg(required = true, allow_hyphen_values = true)]
        coordinates: Vec<Point>,
    },

    /// Round trip visiting every coordinate
    Trip {
        #[arg(required = true, allow_hyphen_values = true)]
        coordinates: Vec<Point>,
    },

    /// Duration and distance between two points
    SimpleRoute {
        #[arg(allow_hyphen_values = true)]
        from: Point,
        #[arg(allow_hyphen_values = true)]
        to: Point,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(cli) {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let data = cli
        .data
        .context("no dataset given: pass --data or set OSRM_DATA_PATH")?;

    info!("🦋 osrm-bridge v{} starting", env!("OSRM_BRIDGE_VERSION"));
    let engine = OsrmEngine::with_config(EngineConfig::new(&data, cli.algorithm))
        .with_context(|| format!("cannot load {}", data.display()))?;

    let payload = execute(&engine, cli.command)?;
    println!("{}", render(&payload, cli.pretty)?);
    Ok(())
}

/// Run one query and return its JSON output.
fn execute(engine: &OsrmEngine, command: Command) -> Result<String> {
    let payload = match command {
        Command::Table {
            coordinates,
            sources,
            destinations,
        } => engine.table_json(&TableRequest {
            coordinates,
            sources,
            destinations,
        })?,
        Command::Route { coordinates } => engine.route_json(&RouteRequest::new(coordinates))?,
        Command::Trip { coordinates } => engine.trip_json(&TripRequest::new(coordinates))?,
        Command::SimpleRoute { from, to } => {
            serde_json::to_string(&engine.simple_route(from, to)?)?
        }
    };
    Ok(payload)
}

fn render(payload: &str, pretty: bool) -> Result<String> {
    if !pretty {
        return Ok(payload.to_string());
    }
    let value: serde_json::Value =
        serde_json::from_str(payload).context("engine returned invalid JSON")?;
    Ok(serde_json::to_string_pretty(&value)?)
}
