use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use fieldroute::{locator, router, LandmarkLink, Node, NodeKind, Point, RouteResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct RequestLoadError(PathBuf, #[source] Box<dyn Error + Send + Sync>);

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Log more details (repeat for even more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a route from a JSON route request
    Route(RouteArgs),

    /// Find the nearest candidates from a JSON locate request
    Locate(LocateArgs),
}

#[derive(Args)]
struct RouteArgs {
    /// Path to the request, or "-" for standard input
    request: PathBuf,

    /// Print the route as a GeoJSON FeatureCollection
    #[arg(long)]
    geojson: bool,

    /// Maximum distance between directly connected nodes, in km
    #[arg(long, default_value_t = router::Options::default().connect_radius_km)]
    connect_radius_km: f64,

    /// Trip length above which the landmark shortcut is attempted, in km
    #[arg(long, default_value_t = router::Options::default().shortcut_threshold_km)]
    shortcut_threshold_km: f64,

    /// Assumed average speed, in km/h
    #[arg(long, default_value_t = router::Options::default().avg_speed_kmh)]
    avg_speed_kmh: f64,

    /// Maximum number of node expansions per search
    #[arg(long, default_value_t = router::Options::default().step_limit)]
    step_limit: usize,
}

#[derive(Args)]
struct LocateArgs {
    /// Path to the request, or "-" for standard input
    request: PathBuf,

    /// Radius increment between searches, in km
    #[arg(long, default_value_t = locator::Options::default().radius_step_km)]
    radius_step_km: f64,

    /// Largest radius searched, in km
    #[arg(long, default_value_t = locator::Options::default().max_radius_km)]
    max_radius_km: f64,
}

/// A worker or landmark as supplied in a request; the label defaults to the id.
#[derive(Deserialize)]
struct Site {
    id: String,
    point: Point,
    label: Option<String>,
}

impl Site {
    fn into_node(self, kind: NodeKind) -> Node {
        let label = self.label.unwrap_or_else(|| self.id.clone());
        Node::new(self.id, self.point, label, kind)
    }
}

#[derive(Deserialize)]
struct RouteRequest {
    origin: Point,
    destination: Point,
    #[serde(default)]
    workers: Vec<Site>,
    #[serde(default)]
    landmarks: Vec<Site>,
    #[serde(default)]
    landmark_links: Vec<LandmarkLink>,
}

#[derive(Deserialize)]
struct LocateRequest {
    center: Point,
    required_count: usize,
    #[serde(default = "default_start_radius_km")]
    start_radius_km: f64,
    pool: Vec<locator::Candidate>,
}

fn default_start_radius_km() -> f64 {
    5.0
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Route(args) => route(args),
        Command::Locate(args) => locate(args),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Warn,
        (false, 1) => log::LevelFilter::Info,
        (false, 2) => log::LevelFilter::Debug,
        (false, _) => log::LevelFilter::Trace,
    };
    colog::default_builder().filter_level(level).init();
}

fn route(args: RouteArgs) -> Result<(), Box<dyn Error>> {
    let request: RouteRequest = load_request(&args.request)?;
    let options = router::Options {
        connect_radius_km: args.connect_radius_km,
        shortcut_threshold_km: args.shortcut_threshold_km,
        avg_speed_kmh: args.avg_speed_kmh,
        step_limit: args.step_limit,
    };

    let workers: Vec<Node> = request
        .workers
        .into_iter()
        .map(|s| s.into_node(NodeKind::Worker))
        .collect();
    let landmarks: Vec<Node> = request
        .landmarks
        .into_iter()
        .map(|s| s.into_node(NodeKind::Landmark))
        .collect();

    let result = fieldroute::compute_route_with_options(
        request.origin,
        request.destination,
        &workers,
        &landmarks,
        &request.landmark_links,
        &options,
    )?;
    log::info!(
        "{}: {} km, {} min, {} waypoints",
        result.algorithm_used,
        result.total_distance_km,
        result.total_time_min,
        result.waypoints.len(),
    );

    if args.geojson {
        print_json(&route_as_geojson(&result))
    } else {
        print_json(&result)
    }
}

fn locate(args: LocateArgs) -> Result<(), Box<dyn Error>> {
    let request: LocateRequest = load_request(&args.request)?;
    let options = locator::Options {
        radius_step_km: args.radius_step_km,
        max_radius_km: args.max_radius_km,
    };

    let result = fieldroute::locate_nearest(
        request.center,
        &request.pool,
        request.required_count,
        request.start_radius_km,
        &options,
    )?;
    if result.is_short_of(request.required_count) {
        log::warn!(
            "insufficient supply: {} of {} candidates within {} km",
            result.matches.len(),
            request.required_count,
            result.radius_used_km,
        );
    }

    print_json(&result)
}

fn route_as_geojson(r: &RouteResult) -> serde_json::Value {
    let coordinates: Vec<[f64; 2]> = r
        .waypoints
        .iter()
        .map(|w| [w.point.lon, w.point.lat])
        .collect();
    let labels: Vec<&str> = r.waypoints.iter().map(|w| w.label.as_str()).collect();

    serde_json::json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {
                "total_distance_km": r.total_distance_km,
                "total_time_min": r.total_time_min,
                "algorithm_used": r.algorithm_used,
                "labels": labels,
            },
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            },
        }],
    })
}

fn load_request<T: DeserializeOwned>(path: &Path) -> Result<T, RequestLoadError> {
    let parse = || -> Result<T, Box<dyn Error + Send + Sync>> {
        let reader: Box<dyn Read> = if path == Path::new("-") {
            Box::new(io::stdin().lock())
        } else {
            Box::new(File::open(path)?)
        };
        Ok(serde_json::from_reader(BufReader::new(reader))?)
    };
    parse().map_err(|e| RequestLoadError(path.to_path_buf(), e))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
