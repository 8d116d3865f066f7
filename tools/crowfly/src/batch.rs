//! Many origin/destination queries over one shared graph

use anyhow::{Context, Result};
use crowfly_core::{find_path, ErrorKind, GraphStore, NodeId, SearchError};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Ok,
    NoPath,
    InvalidNode,
    Cancelled,
    Fault,
}

/// Result of one query, serialisable as a JSON line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub origin: NodeId,
    pub destination: NodeId,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hops: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    fn query(graph: &GraphStore, origin: NodeId, destination: NodeId) -> Self {
        match find_path(graph, origin, destination) {
            Ok(path) => Self {
                origin,
                destination,
                status: BatchStatus::Ok,
                distance_km: Some(path.total_distance_km),
                hops: Some(path.hops()),
                error: None,
            },
            Err(err) => Self {
                origin,
                destination,
                status: status_of(&err),
                distance_km: None,
                hops: None,
                error: Some(err.to_string()),
            },
        }
    }
}

fn status_of(err: &SearchError) -> BatchStatus {
    match err.kind() {
        ErrorKind::Input => BatchStatus::InvalidNode,
        ErrorKind::NotFound => BatchStatus::NoPath,
        ErrorKind::Cancelled => BatchStatus::Cancelled,
        ErrorKind::Internal => BatchStatus::Fault,
    }
}

/// Run every pair, `threads` wide (rayon's default pool when `None`).
/// Outcomes come back in input order.
pub fn run_batch(
    graph: &GraphStore,
    pairs: &[(NodeId, NodeId)],
    threads: Option<usize>,
) -> Result<Vec<BatchOutcome>> {
    let run = || {
        pairs
            .par_iter()
            .map(|&(origin, destination)| BatchOutcome::query(graph, origin, destination))
            .collect::<Vec<_>>()
    };

    let outcomes = match threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .context("failed to build batch thread pool")?
            .install(run),
        None => run(),
    };

    let failed = outcomes
        .iter()
        .filter(|o| o.status != BatchStatus::Ok)
        .count();
    tracing::info!(queries = outcomes.len(), failed, "batch complete");

    Ok(outcomes)
}
