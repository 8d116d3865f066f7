//! Graph Store - immutable undirected road network
//!
//! Nodes are addressed externally by their stable [`NodeId`] and internally
//! by a dense `u32` index into flat arrays. Adjacency is stored CSR-style:
//! the neighbors of dense node `i` live in `heads[offsets[i]..offsets[i + 1]]`
//! with matching `weights`. Every input edge appears twice, once per
//! direction.

use std::sync::Arc;

use rstar::{primitives::GeomWithData, RTree};
use rustc_hash::FxHashMap;

use crate::error::GraphError;
use crate::heuristic::HeuristicCache;

/// External, stable node identifier (OSM node id)
pub type NodeId = i64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn new(id: NodeId, lat: f64, lon: f64) -> Self {
        Self { id, lat, lon }
    }
}

/// Undirected road segment (way) between two nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub distance_km: f64,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, distance_km: f64) -> Self {
        Self {
            from,
            to,
            distance_km,
        }
    }
}

#[derive(Debug)]
pub struct GraphStore {
    ids: Vec<NodeId>,
    index: FxHashMap<NodeId, u32>,
    coords: Vec<(f64, f64)>, // (lat, lon)
    offsets: Vec<u32>,       // n_nodes + 1
    heads: Vec<u32>,         // 2 * n_edges
    weights: Vec<f64>,       // 2 * n_edges
    spatial_index: RTree<GeomWithData<[f64; 2], u32>>,
    heuristics: Arc<HeuristicCache>,
}

/// Build a [`GraphStore`] from node and edge collections.
///
/// All edges are validated before anything is indexed, so a dangling
/// reference fails here rather than during a search.
pub fn build_graph<N, E>(nodes: N, edges: E) -> Result<GraphStore, GraphError>
where
    N: IntoIterator<Item = Node>,
    E: IntoIterator<Item = Edge>,
{
    GraphStore::build(nodes, edges)
}

impl GraphStore {
    pub fn build<N, E>(nodes: N, edges: E) -> Result<Self, GraphError>
    where
        N: IntoIterator<Item = Node>,
        E: IntoIterator<Item = Edge>,
    {
        let nodes = nodes.into_iter();
        let mut ids = Vec::with_capacity(nodes.size_hint().0);
        let mut coords = Vec::with_capacity(nodes.size_hint().0);
        let mut index = FxHashMap::default();

        for node in nodes {
            let valid_lat = node.lat.is_finite() && (-90.0..=90.0).contains(&node.lat);
            let valid_lon = node.lon.is_finite() && (-180.0..=180.0).contains(&node.lon);
            if !valid_lat || !valid_lon {
                return Err(GraphError::InvalidCoordinate {
                    node_id: node.id,
                    lat: node.lat,
                    lon: node.lon,
                });
            }

            let idx = ids.len() as u32;
            if index.insert(node.id, idx).is_some() {
                return Err(GraphError::DuplicateNode { node_id: node.id });
            }
            ids.push(node.id);
            coords.push((node.lat, node.lon));
        }

        // Resolve and validate every edge first; count degrees on the way
        let n_nodes = ids.len();
        let mut degree = vec![0u32; n_nodes];
        let mut resolved = Vec::new();
        for edge in edges {
            let a = *index
                .get(&edge.from)
                .ok_or(GraphError::MissingNode { node_id: edge.from })?;
            let b = *index
                .get(&edge.to)
                .ok_or(GraphError::MissingNode { node_id: edge.to })?;
            if !edge.distance_km.is_finite() || edge.distance_km < 0.0 {
                return Err(GraphError::InvalidDistance {
                    from: edge.from,
                    to: edge.to,
                    distance_km: edge.distance_km,
                });
            }
            degree[a as usize] += 1;
            degree[b as usize] += 1;
            resolved.push((a, b, edge.distance_km));
        }

        let mut offsets = Vec::with_capacity(n_nodes + 1);
        offsets.push(0u32);
        for d in &degree {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + d);
        }

        // Fill in input order so adjacency order is reproducible
        let n_arcs = offsets[n_nodes] as usize;
        let mut cursor: Vec<u32> = offsets[..n_nodes].to_vec();
        let mut heads = vec![0u32; n_arcs];
        let mut weights = vec![0f64; n_arcs];
        for &(a, b, w) in &resolved {
            let slot = cursor[a as usize] as usize;
            heads[slot] = b;
            weights[slot] = w;
            cursor[a as usize] += 1;

            let slot = cursor[b as usize] as usize;
            heads[slot] = a;
            weights[slot] = w;
            cursor[b as usize] += 1;
        }

        let points: Vec<GeomWithData<[f64; 2], u32>> = coords
            .iter()
            .enumerate()
            .map(|(idx, &(lat, lon))| GeomWithData::new([lon, lat], idx as u32))
            .collect();
        let spatial_index = RTree::bulk_load(points);

        tracing::debug!(
            nodes = n_nodes,
            edges = resolved.len(),
            "built graph store"
        );

        Ok(Self {
            ids,
            index,
            coords,
            offsets,
            heads,
            weights,
            spatial_index,
            heuristics: Arc::new(HeuristicCache::new()),
        })
    }

    /// Replace the graph's heuristic cache, e.g. to share one across graphs
    /// built from the same node data
    pub fn with_heuristic_cache(mut self, cache: Arc<HeuristicCache>) -> Self {
        self.heuristics = cache;
        self
    }

    pub fn heuristics(&self) -> &Arc<HeuristicCache> {
        &self.heuristics
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.heads.len() / 2
    }

    /// Neighbors of `id` with edge distances, in input order
    pub fn neighbors_of(&self, id: NodeId) -> Option<impl Iterator<Item = (NodeId, f64)> + '_> {
        let idx = self.index_of(id)?;
        Some(self.neighbors(idx).map(|(n, w)| (self.ids[n as usize], w)))
    }

    /// Shortest direct edge between `a` and `b`, if any
    pub fn edge_distance(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let b_idx = self.index_of(b)?;
        let a_idx = self.index_of(a)?;
        self.neighbors(a_idx)
            .filter(|&(n, _)| n == b_idx)
            .map(|(_, w)| w)
            .min_by(|x, y| x.total_cmp(y))
    }

    /// Straight-line distance in km between two nodes, through the graph's cache
    pub fn crow_fly_km(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let a_idx = self.index_of(a)?;
        let b_idx = self.index_of(b)?;
        Some(self.heuristics.distance(
            a,
            self.coords[a_idx as usize],
            b,
            self.coords[b_idx as usize],
        ))
    }

    /// Nearest node to a coordinate - O(log n) with the R-tree
    pub fn nearest_node(&self, lat: f64, lon: f64) -> Option<NodeId> {
        self.spatial_index
            .nearest_neighbor(&[lon, lat])
            .map(|point| self.ids[point.data as usize])
    }

    #[inline]
    pub(crate) fn index_of(&self, id: NodeId) -> Option<u32> {
        self.index.get(&id).copied()
    }

    #[inline]
    pub(crate) fn id_of(&self, idx: u32) -> NodeId {
        self.ids[idx as usize]
    }

    #[inline]
    pub(crate) fn coord(&self, idx: u32) -> (f64, f64) {
        self.coords[idx as usize]
    }

    #[inline(always)]
    pub(crate) fn neighbors(&self, idx: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
        let start = self.offsets[idx as usize] as usize;
        let end = self.offsets[idx as usize + 1] as usize;
        (start..end).map(move |i| (self.heads[i], self.weights[i]))
    }
}
