//! Error types for graph construction and path search
//!
//! Failures fall in three families. Input errors (`GraphError`,
//! `SearchError::InvalidNode`) mean the caller handed over bad data.
//! `SearchError::NoPath` is a legitimate negative answer. Internal faults
//! (`SearchError::InvariantViolation`, `SearchError::BrokenChain`) mean the
//! engine state went inconsistent and the search was aborted.

use thiserror::Error;

use crate::graph::NodeId;

/// Rejections raised while building a [`GraphStore`](crate::GraphStore)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// An edge endpoint is absent from the node collection
    #[error("edge references node {node_id}, which is not in the node set")]
    MissingNode { node_id: NodeId },

    #[error("node {node_id} is defined more than once")]
    DuplicateNode { node_id: NodeId },

    #[error("node {node_id} has invalid coordinates (lat {lat}, lon {lon})")]
    InvalidCoordinate { node_id: NodeId, lat: f64, lon: f64 },

    /// Distances must be finite and non-negative
    #[error("edge {from} - {to} has invalid distance {distance_km} km")]
    InvalidDistance {
        from: NodeId,
        to: NodeId,
        distance_km: f64,
    },
}

/// Engine state that must never occur with a non-negative, consistent heuristic
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error(
        "closed node {node_id} looks improvable via {via}: \
         {closed_cost_km} km -> {tentative_cost_km} km"
    )]
    ClosedNodeImproved {
        node_id: NodeId,
        via: NodeId,
        closed_cost_km: f64,
        tentative_cost_km: f64,
    },

    #[error("frontier produced node {node_id}, which has no search record")]
    UnrecordedFrontierEntry { node_id: NodeId },

    #[error("parent chain starting at node {node_id} does not terminate")]
    ParentCycle { node_id: NodeId },
}

/// Why [`find_path`](crate::find_path) did not return a path
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("no path from {origin} to {destination}")]
    NoPath { origin: NodeId, destination: NodeId },

    #[error("node {0} is not in the graph")]
    InvalidNode(NodeId),

    /// `consistency_tolerance_km` must be finite and non-negative
    #[error("consistency tolerance must be a finite, non-negative number of km, got {0}")]
    InvalidTolerance(f64),

    /// The observer or the settle limit stopped the search
    #[error("search cancelled after settling {settled} nodes")]
    Cancelled { settled: usize },

    #[error("search invariant violated: {0}")]
    InvariantViolation(#[from] InvariantViolation),

    #[error("parent chain broken at node {node_id}: node {missing} has no search record")]
    BrokenChain { node_id: NodeId, missing: NodeId },
}

/// Coarse classification used by drivers to pick a message and exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-supplied data or ids are wrong
    Input,
    /// The search completed and there is no route
    NotFound,
    /// Stopped on request
    Cancelled,
    /// A defect in the engine
    Internal,
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::InvalidNode(_) | SearchError::InvalidTolerance(_) => ErrorKind::Input,
            SearchError::NoPath { .. } => ErrorKind::NotFound,
            SearchError::Cancelled { .. } => ErrorKind::Cancelled,
            SearchError::InvariantViolation(_) | SearchError::BrokenChain { .. } => {
                ErrorKind::Internal
            }
        }
    }

    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Input
    }
}
