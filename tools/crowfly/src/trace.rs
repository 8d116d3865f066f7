//! Settled-node trace as CSV, one row per closed node
//!
//! The columns are what a map overlay needs to replay the search:
//! `node_id,best_cost_km,a_star_score_km,heuristic_km,parent`.

use std::io::Write;
use std::ops::ControlFlow;

use crowfly_core::{SearchObserver, SettledNode};

pub struct TraceWriter<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
    error: Option<csv::Error>,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
            rows: 0,
            error: None,
        }
    }

    /// Flush and surface the first write error, if the search hit one
    pub fn finish(mut self) -> Result<usize, csv::Error> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.rows)
    }
}

impl<W: Write> SearchObserver for TraceWriter<W> {
    fn on_settled(&mut self, node: &SettledNode) -> ControlFlow<()> {
        match self.writer.serialize(node) {
            Ok(()) => {
                self.rows += 1;
                ControlFlow::Continue(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "trace write failed, stopping search");
                self.error = Some(err);
                ControlFlow::Break(())
            }
        }
    }
}
