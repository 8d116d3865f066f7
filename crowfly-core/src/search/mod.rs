//! A* engine
//!
//! One call owns its [`SearchState`](state::SearchState) and
//! [`Frontier`](frontier::Frontier); the graph and heuristic cache are
//! only read (the cache is also filled), so any number of searches may
//! run against one graph at the same time.
//!
//! Loop, per popped frontier entry:
//! 1. entry for an already closed node: stale, skip
//! 2. close the node, notify the observer
//! 3. destination closed: done
//! 4. relax every neighbor, pushing a fresh entry on each improvement

mod frontier;
mod observer;
pub(crate) mod state;

use serde::Serialize;

use crate::error::{InvariantViolation, SearchError};
use crate::graph::{GraphStore, NodeId};
use crate::heuristic::HeuristicCache;
use crate::path::{reconstruct, PathResult};

use frontier::{Frontier, FrontierEntry};
use state::{Relaxation, SearchState};

pub use observer::{NoopObserver, SearchObserver, SettledNode};

/// Tuning knobs for a single search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Slack, in km, before a cheaper path to a closed node counts as an
    /// invariant violation. Absorbs float rounding in edge distances.
    pub consistency_tolerance_km: f64,
    /// Stop with [`SearchError::Cancelled`] after this many closed nodes
    pub max_settled: Option<usize>,
}

impl SearchOptions {
    /// Reject a tolerance that would disable (NaN, infinity) or distort
    /// (negative) the closed-node check
    pub fn validate(&self) -> Result<(), SearchError> {
        let tolerance = self.consistency_tolerance_km;
        if tolerance.is_finite() && tolerance >= 0.0 {
            Ok(())
        } else {
            Err(SearchError::InvalidTolerance(tolerance))
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            consistency_tolerance_km: 1e-9,
            max_settled: None,
        }
    }
}

/// Work counters for one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Nodes moved to the closed set
    pub settled: usize,
    /// Frontier entries discarded as superseded
    pub stale_skipped: usize,
    /// Edges examined from closed nodes
    pub edges_relaxed: usize,
    pub frontier_pushes: u64,
    /// Heuristic lookups (one per discovered node)
    pub heuristic_evaluations: usize,
    pub max_frontier_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Running,
    Succeeded,
    Failed,
}

/// Shortest path between two node ids with default options and the graph's
/// own heuristic cache
pub fn find_path(
    graph: &GraphStore,
    origin: NodeId,
    destination: NodeId,
) -> Result<PathResult, SearchError> {
    find_path_with(
        graph,
        graph.heuristics(),
        origin,
        destination,
        &SearchOptions::default(),
        &mut NoopObserver,
    )
}

/// Shortest path with an explicit cache, options and observer
pub fn find_path_with<O>(
    graph: &GraphStore,
    cache: &HeuristicCache,
    origin: NodeId,
    destination: NodeId,
    options: &SearchOptions,
    observer: &mut O,
) -> Result<PathResult, SearchError>
where
    O: SearchObserver + ?Sized,
{
    options.validate()?;

    let origin_idx = graph
        .index_of(origin)
        .ok_or(SearchError::InvalidNode(origin))?;
    let destination_idx = graph
        .index_of(destination)
        .ok_or(SearchError::InvalidNode(destination))?;

    if origin_idx == destination_idx {
        return Ok(PathResult::single(origin));
    }

    let result = AStar::new(graph, cache, destination_idx, options).run(origin_idx, observer);

    match &result {
        Ok(path) => tracing::debug!(
            origin,
            destination,
            distance_km = path.total_distance_km,
            hops = path.hops(),
            settled = path.stats.settled,
            "path found"
        ),
        Err(err) if err.is_internal() => {
            tracing::error!(origin, destination, error = %err, "search aborted")
        }
        Err(err) => tracing::debug!(origin, destination, error = %err, "search ended"),
    }

    result
}

struct AStar<'a> {
    graph: &'a GraphStore,
    cache: &'a HeuristicCache,
    destination: u32,
    destination_id: NodeId,
    destination_coord: (f64, f64),
    options: &'a SearchOptions,
    state: SearchState,
    frontier: Frontier,
    stats: SearchStats,
}

impl<'a> AStar<'a> {
    fn new(
        graph: &'a GraphStore,
        cache: &'a HeuristicCache,
        destination: u32,
        options: &'a SearchOptions,
    ) -> Self {
        Self {
            graph,
            cache,
            destination,
            destination_id: graph.id_of(destination),
            destination_coord: graph.coord(destination),
            options,
            state: SearchState::new(),
            frontier: Frontier::new(),
            stats: SearchStats::default(),
        }
    }

    fn run<O>(mut self, origin: u32, observer: &mut O) -> Result<PathResult, SearchError>
    where
        O: SearchObserver + ?Sized,
    {
        let h = self.heuristic(origin);
        self.state.seed(origin, h);
        self.frontier.push(origin, h);

        let mut status = Status::Running;
        while status == Status::Running {
            let Some(entry) = self.frontier.pop() else {
                status = Status::Failed;
                break;
            };

            let Some(settled) = self.settle(entry)? else {
                continue;
            };

            if observer.on_settled(&settled).is_break() {
                return Err(SearchError::Cancelled {
                    settled: self.stats.settled,
                });
            }

            if entry.node == self.destination {
                status = Status::Succeeded;
            } else if self
                .options
                .max_settled
                .is_some_and(|max| self.stats.settled >= max)
            {
                return Err(SearchError::Cancelled {
                    settled: self.stats.settled,
                });
            } else {
                self.expand(entry.node)?;
            }
        }

        self.stats.frontier_pushes = self.frontier.pushes();
        self.stats.max_frontier_len = self.frontier.max_len();

        match status {
            Status::Succeeded => {
                let nodes = reconstruct(self.graph, &self.state, self.destination)?;
                let total_distance_km = nodes
                    .last()
                    .map(|step| step.cumulative_cost_km)
                    .unwrap_or_default();
                Ok(PathResult {
                    total_distance_km,
                    nodes,
                    stats: self.stats,
                })
            }
            Status::Failed | Status::Running => Err(SearchError::NoPath {
                origin: self.graph.id_of(origin),
                destination: self.destination_id,
            }),
        }
    }

    /// Close the node behind `entry`, or `None` if the entry is stale
    fn settle(&mut self, entry: FrontierEntry) -> Result<Option<SettledNode>, SearchError> {
        match self.state.get(entry.node).map(|record| record.in_closed_set) {
            Some(true) => {
                self.stats.stale_skipped += 1;
                return Ok(None);
            }
            Some(false) => {}
            None => {
                return Err(InvariantViolation::UnrecordedFrontierEntry {
                    node_id: self.graph.id_of(entry.node),
                }
                .into())
            }
        }
        let record = self
            .state
            .close(entry.node)
            .ok_or(InvariantViolation::UnrecordedFrontierEntry {
                node_id: self.graph.id_of(entry.node),
            })?;
        self.stats.settled += 1;

        let settled = SettledNode {
            node_id: self.graph.id_of(entry.node),
            best_cost_km: record.best_cost,
            a_star_score_km: record.a_star_score(),
            heuristic_km: record.heuristic,
            parent: record.parent.map(|p| self.graph.id_of(p)),
        };
        tracing::trace!(
            node = settled.node_id,
            cost_km = settled.best_cost_km,
            score_km = settled.a_star_score_km,
            "settled"
        );
        Ok(Some(settled))
    }

    fn expand(&mut self, node: u32) -> Result<(), SearchError> {
        let graph = self.graph;
        let cache = self.cache;
        let destination_id = self.destination_id;
        let destination_coord = self.destination_coord;
        let tolerance = self.options.consistency_tolerance_km;

        let base = match self.state.get(node) {
            Some(record) => record.best_cost,
            None => {
                return Err(InvariantViolation::UnrecordedFrontierEntry {
                    node_id: graph.id_of(node),
                }
                .into())
            }
        };

        for (neighbor, weight) in graph.neighbors(node) {
            self.stats.edges_relaxed += 1;
            let tentative = base + weight;

            let mut evaluated = false;
            let outcome = self.state.relax(neighbor, node, tentative, tolerance, || {
                evaluated = true;
                cache.distance(
                    graph.id_of(neighbor),
                    graph.coord(neighbor),
                    destination_id,
                    destination_coord,
                )
            });
            if evaluated {
                self.stats.heuristic_evaluations += 1;
            }

            match outcome {
                Relaxation::Discovered { score } | Relaxation::Improved { score } => {
                    self.frontier.push(neighbor, score);
                }
                Relaxation::Unchanged => {}
                Relaxation::ClosedImproved { closed_cost } => {
                    let violation = InvariantViolation::ClosedNodeImproved {
                        node_id: graph.id_of(neighbor),
                        via: graph.id_of(node),
                        closed_cost_km: closed_cost,
                        tentative_cost_km: tentative,
                    };
                    tracing::warn!(%violation, "heuristic is not consistent for this graph");
                    return Err(violation.into());
                }
            }
        }

        Ok(())
    }

    fn heuristic(&mut self, node: u32) -> f64 {
        self.stats.heuristic_evaluations += 1;
        self.cache.distance(
            self.graph.id_of(node),
            self.graph.coord(node),
            self.destination_id,
            self.destination_coord,
        )
    }
}
