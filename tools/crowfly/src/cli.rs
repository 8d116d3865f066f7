//! Command line surface and command dispatch

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crowfly_core::{
    find_path_with, ErrorKind, GraphError, GraphStore, HeuristicCache, NodeId, NoopObserver,
    PathResult, SearchError, SearchOptions,
};

use crate::batch::{run_batch, BatchStatus};
use crate::loader::{load_pairs, RoadData};
use crate::logging::LogFormat;
use crate::report::RouteReport;
use crate::trace::TraceWriter;

#[derive(Debug, Parser)]
#[command(name = "crowfly")]
#[command(about = "Shortest road paths with A* and a great-circle heuristic", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log output format (stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find the shortest route between two nodes or coordinates
    Route {
        #[command(flatten)]
        graph: GraphArgs,
        /// Origin node id
        #[arg(long, allow_hyphen_values = true, conflicts_with = "from_coord", required_unless_present = "from_coord")]
        from: Option<NodeId>,
        /// Origin coordinate (lat,lon), snapped to the nearest node
        #[arg(long, value_parser = parse_coord, allow_hyphen_values = true)]
        from_coord: Option<(f64, f64)>,
        /// Destination node id
        #[arg(long, allow_hyphen_values = true, conflicts_with = "to_coord", required_unless_present = "to_coord")]
        to: Option<NodeId>,
        /// Destination coordinate (lat,lon), snapped to the nearest node
        #[arg(long, value_parser = parse_coord, allow_hyphen_values = true)]
        to_coord: Option<(f64, f64)>,
        /// Print the route as JSON
        #[arg(long)]
        json: bool,
        /// Write every settled node to this CSV file
        #[arg(long)]
        trace: Option<PathBuf>,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Run origin,destination pairs from a CSV file in parallel
    Batch {
        #[command(flatten)]
        graph: GraphArgs,
        /// CSV with `origin,destination` columns
        #[arg(long)]
        pairs: PathBuf,
        /// Worker threads (defaults to one per core)
        #[arg(long)]
        threads: Option<usize>,
        /// Most straight-line distances kept in memory across queries
        #[arg(long, default_value_t = 4_000_000)]
        cache_capacity: usize,
        /// One JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// Print graph size
    Stats {
        #[command(flatten)]
        graph: GraphArgs,
    },
}

#[derive(Debug, Args)]
pub struct GraphArgs {
    /// Node table (id,lat,lon[,name]); .gz accepted
    #[arg(long, env = "CROWFLY_NODES")]
    pub nodes: PathBuf,
    /// Way table (node_from,node_to,distance_km); .gz accepted
    #[arg(long, env = "CROWFLY_WAYS")]
    pub ways: PathBuf,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Slack in km before a cheaper path to a closed node is a fault
    #[arg(long, default_value_t = 1e-9, value_parser = parse_tolerance)]
    pub tolerance_km: f64,
    /// Give up after settling this many nodes
    #[arg(long)]
    pub max_settled: Option<usize>,
}

impl From<&SearchArgs> for SearchOptions {
    fn from(args: &SearchArgs) -> Self {
        SearchOptions {
            consistency_tolerance_km: args.tolerance_km,
            max_settled: args.max_settled,
        }
    }
}

fn parse_coord(s: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| "coordinate must be in format 'lat,lon'".to_string())?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {e}"))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinate {lat},{lon} is out of range"));
    }
    Ok((lat, lon))
}

fn parse_tolerance(s: &str) -> Result<f64, String> {
    let tolerance: f64 = s.trim().parse().map_err(|e| format!("bad tolerance: {e}"))?;
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(tolerance)
    } else {
        Err(format!("tolerance must be a finite number >= 0, got {tolerance}"))
    }
}

/// Process exit status for a failed command
///
/// 1 bad input or configuration, 2 no route, 3 internal fault.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let kind = err.chain().find_map(|cause| {
        cause
            .downcast_ref::<SearchError>()
            .map(SearchError::kind)
            .or_else(|| cause.downcast_ref::<GraphError>().map(GraphError::kind))
    });
    match kind {
        Some(ErrorKind::NotFound | ErrorKind::Cancelled) => 2,
        Some(ErrorKind::Internal) => 3,
        Some(ErrorKind::Input) | None => 1,
    }
}

pub fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Route {
            graph,
            from,
            from_coord,
            to,
            to_coord,
            json,
            trace,
            search,
        } => {
            let (data, graph) = load_graph(&graph)?;
            let origin = resolve_endpoint(&graph, from, from_coord, "origin")?;
            let destination = resolve_endpoint(&graph, to, to_coord, "destination")?;
            let options = SearchOptions::from(&search);

            tracing::info!(origin, destination, "routing");
            let start = Instant::now();
            let result = match &trace {
                Some(path) => route_with_trace(&graph, origin, destination, &options, path)?,
                None => find_path_with(
                    &graph,
                    graph.heuristics(),
                    origin,
                    destination,
                    &options,
                    &mut NoopObserver,
                ),
            };
            let elapsed = start.elapsed();
            let path = result.with_context(|| format!("no route from {origin} to {destination}"))?;

            let crow_fly = graph.crow_fly_km(origin, destination).unwrap_or_default();
            let report = RouteReport::new(&path, &data, crow_fly, elapsed);

            let mut out = io::stdout().lock();
            if json {
                report.write_json(&mut out)?;
            } else {
                report.write_text(&mut out)?;
            }
        }
        Commands::Batch {
            graph,
            pairs,
            threads,
            cache_capacity,
            json,
        } => {
            let (_, graph) = load_graph(&graph)?;
            let graph = graph.with_heuristic_cache(Arc::new(HeuristicCache::with_capacity_limit(
                cache_capacity,
            )));
            let pairs = load_pairs(&pairs)?;

            let start = Instant::now();
            let outcomes = run_batch(&graph, &pairs, threads)?;
            tracing::info!(
                elapsed_s = start.elapsed().as_secs_f64(),
                cached_heuristics = graph.heuristics().len(),
                cache_misses = graph.heuristics().misses(),
                "batch finished"
            );

            let mut out = io::stdout().lock();
            for outcome in &outcomes {
                if json {
                    serde_json::to_writer(&mut out, outcome)?;
                    writeln!(out)?;
                } else {
                    match (outcome.status, outcome.distance_km) {
                        (BatchStatus::Ok, Some(km)) => writeln!(
                            out,
                            "{} -> {}: {:.3} km, {} hops",
                            outcome.origin,
                            outcome.destination,
                            km,
                            outcome.hops.unwrap_or_default()
                        )?,
                        _ => writeln!(
                            out,
                            "{} -> {}: {}",
                            outcome.origin,
                            outcome.destination,
                            outcome.error.as_deref().unwrap_or("failed")
                        )?,
                    }
                }
            }
        }
        Commands::Stats { graph } => {
            let (data, graph) = load_graph(&graph)?;
            let mut out = io::stdout().lock();
            writeln!(out, "Nodes: {}", graph.node_count())?;
            writeln!(out, "Edges: {}", graph.edge_count())?;
            writeln!(out, "Named nodes: {}", data.names.len())?;
        }
    }
    Ok(())
}

fn load_graph(args: &GraphArgs) -> Result<(RoadData, GraphStore)> {
    let start = Instant::now();
    let data = RoadData::load(&args.nodes, &args.ways)?;
    let graph = data.build_graph().context("invalid road graph")?;
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        elapsed_s = start.elapsed().as_secs_f64(),
        "graph ready"
    );
    Ok((data, graph))
}

fn resolve_endpoint(
    graph: &GraphStore,
    id: Option<NodeId>,
    coord: Option<(f64, f64)>,
    role: &str,
) -> Result<NodeId> {
    match (id, coord) {
        (Some(id), _) => Ok(id),
        (None, Some((lat, lon))) => {
            let node = graph
                .nearest_node(lat, lon)
                .with_context(|| format!("no node near {role} {lat},{lon}: graph is empty"))?;
            tracing::info!(role, lat, lon, node, "snapped coordinate to nearest node");
            Ok(node)
        }
        (None, None) => anyhow::bail!("{role} is required"),
    }
}

fn route_with_trace(
    graph: &GraphStore,
    origin: NodeId,
    destination: NodeId,
    options: &SearchOptions,
    path: &Path,
) -> Result<Result<PathResult, SearchError>> {
    let file = File::create(path)
        .with_context(|| format!("failed to create trace file {}", path.display()))?;
    let mut trace = TraceWriter::new(BufWriter::new(file));

    let result = find_path_with(
        graph,
        graph.heuristics(),
        origin,
        destination,
        options,
        &mut trace,
    );
    let rows = trace
        .finish()
        .with_context(|| format!("failed to write trace file {}", path.display()))?;
    tracing::info!(rows, path = %path.display(), "wrote search trace");

    Ok(result)
}
