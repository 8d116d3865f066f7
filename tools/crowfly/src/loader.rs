//! Node and way tables from CSV, plain or gzip-compressed
//!
//! `nodes` needs `id,lat,lon` and may carry `name`; `ways` needs
//! `node_from,node_to,distance_km`. Other columns are ignored. Files whose
//! name ends in `.gz` are decompressed on the fly.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crowfly_core::{build_graph, Edge, GraphError, GraphStore, Node, NodeId};
use flate2::read::GzDecoder;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed row in {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Deserialize)]
struct NodeRow {
    id: NodeId,
    lat: f64,
    lon: f64,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WayRow {
    node_from: NodeId,
    node_to: NodeId,
    distance_km: f64,
}

#[derive(Debug, Deserialize)]
struct PairRow {
    origin: NodeId,
    destination: NodeId,
}

/// Everything read from the node and way tables
#[derive(Debug, Default)]
pub struct RoadData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Display names, only for nodes with a non-empty `name`
    pub names: FxHashMap<NodeId, String>,
}

impl RoadData {
    pub fn load(nodes_path: &Path, ways_path: &Path) -> Result<Self, LoadError> {
        let (nodes, names) = load_nodes(nodes_path)?;
        let edges = load_ways(ways_path)?;
        tracing::info!(
            nodes = nodes.len(),
            ways = edges.len(),
            named = names.len(),
            "loaded road tables"
        );
        Ok(Self {
            nodes,
            edges,
            names,
        })
    }

    pub fn build_graph(&self) -> Result<GraphStore, GraphError> {
        build_graph(self.nodes.iter().copied(), self.edges.iter().copied())
    }

    /// Display name of a node, if the node table gave it one
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }
}

fn open(path: &Path) -> Result<Box<dyn Read>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let gzipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if gzipped {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

fn read_rows<T>(path: &Path) -> Result<Vec<T>, LoadError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(open(path)?);

    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

pub fn load_nodes(path: &Path) -> Result<(Vec<Node>, FxHashMap<NodeId, String>), LoadError> {
    let rows: Vec<NodeRow> = read_rows(path)?;
    let mut names = FxHashMap::default();
    let nodes = rows
        .into_iter()
        .map(|row| {
            if let Some(name) = row.name.filter(|n| !n.is_empty()) {
                names.insert(row.id, name);
            }
            Node::new(row.id, row.lat, row.lon)
        })
        .collect();
    Ok((nodes, names))
}

pub fn load_ways(path: &Path) -> Result<Vec<Edge>, LoadError> {
    let rows: Vec<WayRow> = read_rows(path)?;
    Ok(rows
        .into_iter()
        .map(|row| Edge::new(row.node_from, row.node_to, row.distance_km))
        .collect())
}

/// Origin/destination pairs for batch runs (`origin,destination` columns)
pub fn load_pairs(path: &Path) -> Result<Vec<(NodeId, NodeId)>, LoadError> {
    let rows: Vec<PairRow> = read_rows(path)?;
    Ok(rows
        .into_iter()
        .map(|row| (row.origin, row.destination))
        .collect())
}
