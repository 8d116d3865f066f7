//! Route output, plain text or JSON

use std::io::{self, Write};
use std::time::Duration;

use crowfly_core::{NodeId, PathResult, SearchStats};
use serde::Serialize;

use crate::loader::RoadData;

#[derive(Debug, Serialize)]
pub struct RouteReport {
    pub origin: NodeId,
    pub destination: NodeId,
    pub crow_fly_km: f64,
    pub distance_km: f64,
    pub query_ms: f64,
    pub nodes: Vec<ReportNode>,
    pub stats: SearchStats,
}

#[derive(Debug, Serialize)]
pub struct ReportNode {
    pub node_id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub cumulative_km: f64,
}

impl RouteReport {
    pub fn new(path: &PathResult, data: &RoadData, crow_fly_km: f64, elapsed: Duration) -> Self {
        Self {
            origin: path.origin(),
            destination: path.destination(),
            crow_fly_km,
            distance_km: path.total_distance_km,
            query_ms: elapsed.as_secs_f64() * 1000.0,
            nodes: path
                .nodes
                .iter()
                .map(|step| ReportNode {
                    node_id: step.node_id,
                    name: data.name(step.node_id).map(str::to_owned),
                    cumulative_km: step.cumulative_cost_km,
                })
                .collect(),
            stats: path.stats,
        }
    }

    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Route {} -> {}", self.origin, self.destination)?;
        writeln!(out, "Crow-fly: {:.3} km", self.crow_fly_km)?;
        writeln!(out, "Distance: {:.3} km", self.distance_km)?;
        writeln!(
            out,
            "Query: {:.3} ms ({} settled, {} stale skipped)",
            self.query_ms, self.stats.settled, self.stats.stale_skipped
        )?;
        writeln!(out, "Nodes in path: {}", self.nodes.len())?;
        for node in &self.nodes {
            match &node.name {
                Some(name) => writeln!(
                    out,
                    "  {:>10.3} km  {} ({})",
                    node.cumulative_km, node.node_id, name
                )?,
                None => writeln!(out, "  {:>10.3} km  {}", node.cumulative_km, node.node_id)?,
            }
        }
        Ok(())
    }

    pub fn write_json<W: Write>(&self, out: &mut W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out).map_err(serde_json::Error::io)
    }
}
