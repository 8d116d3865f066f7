//! Path Reconstructor - parent links to a forward path

use serde::Serialize;

use crate::error::{InvariantViolation, SearchError};
use crate::graph::{GraphStore, NodeId};
use crate::search::state::SearchState;
use crate::search::SearchStats;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathStep {
    pub node_id: NodeId,
    /// Distance from the origin to this node, in km
    pub cumulative_cost_km: f64,
}

/// Shortest path from origin to destination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub total_distance_km: f64,
    /// Origin first, destination last
    pub nodes: Vec<PathStep>,
    pub stats: SearchStats,
}

impl PathResult {
    pub(crate) fn single(node_id: NodeId) -> Self {
        Self {
            total_distance_km: 0.0,
            nodes: vec![PathStep {
                node_id,
                cumulative_cost_km: 0.0,
            }],
            stats: SearchStats::default(),
        }
    }

    pub fn origin(&self) -> NodeId {
        self.nodes[0].node_id
    }

    pub fn destination(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1].node_id
    }

    /// Number of edges traversed
    pub fn hops(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|step| step.node_id)
    }
}

/// Walk parent links from `destination` back to the origin and reverse them.
///
/// The origin is the only record without a parent, so reaching it ends the
/// walk. A parent without a record is a [`SearchError::BrokenChain`]; a walk
/// longer than the number of records means the links form a cycle.
pub(crate) fn reconstruct(
    graph: &GraphStore,
    state: &SearchState,
    destination: u32,
) -> Result<Vec<PathStep>, SearchError> {
    let mut record = state.get(destination).ok_or(SearchError::BrokenChain {
        node_id: graph.id_of(destination),
        missing: graph.id_of(destination),
    })?;

    let mut current = destination;
    let mut steps = vec![PathStep {
        node_id: graph.id_of(current),
        cumulative_cost_km: record.best_cost,
    }];

    while let Some(parent) = record.parent {
        if steps.len() > state.len() {
            return Err(InvariantViolation::ParentCycle {
                node_id: graph.id_of(destination),
            }
            .into());
        }

        record = state.get(parent).ok_or(SearchError::BrokenChain {
            node_id: graph.id_of(current),
            missing: graph.id_of(parent),
        })?;
        current = parent;
        steps.push(PathStep {
            node_id: graph.id_of(current),
            cumulative_cost_km: record.best_cost,
        });
    }

    steps.reverse();
    Ok(steps)
}
