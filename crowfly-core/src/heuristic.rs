//! Straight-line distance and its memoization
//!
//! The A* heuristic is the great-circle distance from a node to the
//! destination. Road distance is never shorter than that, so the estimate
//! is admissible for road networks.

use std::sync::atomic::{AtomicU64, Ordering};

use geo::{Distance, Haversine, Point};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::graph::NodeId;

/// Haversine distance in kilometers between two `(lat, lon)` pairs,
/// on a sphere of Earth's mean radius
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let p1 = Point::new(a.1, a.0);
    let p2 = Point::new(b.1, b.0);
    Haversine::distance(p1, p2) / 1000.0
}

/// Memoized node-to-node straight-line distances
///
/// Keys are unordered node pairs, so `(a, b)` and `(b, a)` share one slot.
/// Safe to share between concurrent searches: readers never block each
/// other, and two writers racing on the same key store the same value.
///
/// A cache is tied to one set of node coordinates. Use it only with graphs
/// built from that node data.
///
/// Entries are never evicted. Every destination adds one entry per node the
/// search discovers, so a long-lived cache serving many destinations keeps
/// growing; [`HeuristicCache::with_capacity_limit`] caps it. Once full, new
/// pairs are computed on every lookup and not stored.
#[derive(Debug, Default)]
pub struct HeuristicCache {
    entries: RwLock<FxHashMap<(NodeId, NodeId), f64>>,
    max_entries: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[inline]
fn canonical(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl HeuristicCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that stops storing new pairs once it holds `max_entries`
    pub fn with_capacity_limit(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
            ..Self::default()
        }
    }

    pub fn capacity_limit(&self) -> Option<usize> {
        self.max_entries
    }

    /// Cached distance between `a` and `b`, if present
    pub fn get(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.entries.read().get(&canonical(a, b)).copied()
    }

    /// Return the cached distance for `(a, b)` or compute and store it.
    ///
    /// `compute` runs without holding the lock. A zero distance is a
    /// cached value like any other.
    pub fn get_or_compute<F>(&self, a: NodeId, b: NodeId, compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        let key = canonical(a, b);
        if let Some(&distance) = self.entries.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return distance;
        }

        let distance = compute();
        self.misses.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.entries.write();
        if let Some(&stored) = entries.get(&key) {
            // First writer wins; later writers computed the same value anyway
            return stored;
        }
        let has_room = match self.max_entries {
            Some(max) => entries.len() < max,
            None => true,
        };
        if has_room {
            entries.insert(key, distance);
        }
        distance
    }

    /// Straight-line distance between two known coordinates, memoized by id
    pub fn distance(
        &self,
        a: NodeId,
        a_coord: (f64, f64),
        b: NodeId,
        b_coord: (f64, f64),
    ) -> f64 {
        self.get_or_compute(a, b, || haversine_km(a_coord, b_coord))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
