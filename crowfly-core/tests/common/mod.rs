//! Shared fixtures: synthetic road grids and a reference Dijkstra

#![allow(dead_code)]

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crowfly_core::{build_graph, haversine_km, Edge, GraphStore, Node, NodeId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn grid_id(row: usize, col: usize, cols: usize) -> NodeId {
    1_000 + (row * cols + col) as NodeId
}

/// `rows x cols` grid around Foix with roads to the right and below.
///
/// Each road is its straight-line length stretched by 0-60%, so road
/// distance never undercuts the heuristic. Each road is dropped with
/// probability `drop_rate` to make detours.
pub fn road_grid(rows: usize, cols: usize, seed: u64, drop_rate: f64) -> (Vec<Node>, Vec<Edge>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut nodes = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let lat = 42.95 + r as f64 * 0.004 + rng.random::<f64>() * 0.001;
            let lon = 1.60 + c as f64 * 0.005 + rng.random::<f64>() * 0.001;
            nodes.push(Node::new(grid_id(r, c, cols), lat, lon));
        }
    }

    let coord = |id: NodeId| {
        let n = &nodes[(id - 1_000) as usize];
        (n.lat, n.lon)
    };

    let mut edges = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            let here = grid_id(r, c, cols);
            let mut targets = Vec::new();
            if c + 1 < cols {
                targets.push(grid_id(r, c + 1, cols));
            }
            if r + 1 < rows {
                targets.push(grid_id(r + 1, c, cols));
            }
            for there in targets {
                if rng.random_bool(drop_rate) {
                    continue;
                }
                let stretch = 1.0 + rng.random::<f64>() * 0.6;
                let d = haversine_km(coord(here), coord(there)) * stretch;
                edges.push(Edge::new(here, there, d));
            }
        }
    }
    (nodes, edges)
}

/// Grid with about a tenth of the roads missing; some pairs may be cut off
pub fn grid_graph(rows: usize, cols: usize, seed: u64) -> GraphStore {
    let (nodes, edges) = road_grid(rows, cols, seed, 0.1);
    build_graph(nodes, edges).unwrap()
}

/// Grid with every road present, so any two nodes are connected
pub fn connected_grid_graph(rows: usize, cols: usize, seed: u64) -> GraphStore {
    let (nodes, edges) = road_grid(rows, cols, seed, 0.0);
    build_graph(nodes, edges).unwrap()
}

/// Plain Dijkstra over the public adjacency API
pub fn dijkstra(graph: &GraphStore, origin: NodeId, destination: NodeId) -> Option<f64> {
    let mut dist: HashMap<NodeId, f64> = HashMap::new();
    let mut heap = BinaryHeap::new();
    dist.insert(origin, 0.0);
    heap.push(Reverse((OrdF64(0.0), origin)));

    while let Some(Reverse((OrdF64(d), u))) = heap.pop() {
        if u == destination {
            return Some(d);
        }
        if d > dist[&u] {
            continue;
        }
        for (v, w) in graph.neighbors_of(u).unwrap() {
            let nd = d + w;
            if nd < *dist.get(&v).unwrap_or(&f64::INFINITY) {
                dist.insert(v, nd);
                heap.push(Reverse((OrdF64(nd), v)));
            }
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrdF64(pub f64);

impl Eq for OrdF64 {}

impl PartialOrd for OrdF64 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF64 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}
