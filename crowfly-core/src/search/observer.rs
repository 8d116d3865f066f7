//! Hooks for watching a search without the engine knowing who watches

use std::ops::ControlFlow;

use serde::Serialize;

use crate::graph::NodeId;

/// Snapshot of a node at the moment it is finalized
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SettledNode {
    pub node_id: NodeId,
    pub best_cost_km: f64,
    pub a_star_score_km: f64,
    pub heuristic_km: f64,
    pub parent: Option<NodeId>,
}

/// Called once per closed node, in closing order.
///
/// Returning `ControlFlow::Break(())` stops the search with
/// [`SearchError::Cancelled`](crate::SearchError::Cancelled).
pub trait SearchObserver {
    fn on_settled(&mut self, node: &SettledNode) -> ControlFlow<()>;
}

/// Observer that watches nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    #[inline]
    fn on_settled(&mut self, _node: &SettledNode) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F> SearchObserver for F
where
    F: FnMut(&SettledNode) -> ControlFlow<()>,
{
    fn on_settled(&mut self, node: &SettledNode) -> ControlFlow<()> {
        self(node)
    }
}
