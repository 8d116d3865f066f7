//! Per-run search records
//!
//! One [`SearchRecord`] per discovered node, keyed by dense node index.
//! The frontier only ever holds `(score, index)` snapshots; the record here
//! is the single source of truth for cost, parent and closed status.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SearchRecord {
    /// Cost-so-far from the origin, in km
    pub best_cost: f64,
    /// Straight-line estimate to the destination, fixed for the run
    pub heuristic: f64,
    /// Dense index of the predecessor; `None` only for the origin
    pub parent: Option<u32>,
    pub in_closed_set: bool,
}

impl SearchRecord {
    #[inline]
    pub fn a_star_score(&self) -> f64 {
        self.best_cost + self.heuristic
    }
}

/// Outcome of offering a tentative cost to a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Relaxation {
    /// First time the node is seen; push with this score
    Discovered { score: f64 },
    /// Cheaper path to an open node; push with this score
    Improved { score: f64 },
    /// Existing cost is as good or better
    Unchanged,
    /// The node is closed and the offer beats its final cost
    ClosedImproved { closed_cost: f64 },
}

#[derive(Debug, Default)]
pub(crate) struct SearchState {
    records: FxHashMap<u32, SearchRecord>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&mut self, origin: u32, heuristic: f64) {
        self.records.insert(
            origin,
            SearchRecord {
                best_cost: 0.0,
                heuristic,
                parent: None,
                in_closed_set: false,
            },
        );
    }

    #[inline]
    pub fn get(&self, node: u32) -> Option<&SearchRecord> {
        self.records.get(&node)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Finalize `node`. Returns the record, or `None` if it was never discovered.
    pub fn close(&mut self, node: u32) -> Option<SearchRecord> {
        let record = self.records.get_mut(&node)?;
        record.in_closed_set = true;
        Some(*record)
    }

    /// Offer `tentative_cost` via `parent` to `node`.
    ///
    /// `heuristic` runs only on first discovery. A closed node is never
    /// mutated; improving on it by more than `tolerance` is reported as
    /// [`Relaxation::ClosedImproved`].
    pub fn relax<H>(
        &mut self,
        node: u32,
        parent: u32,
        tentative_cost: f64,
        tolerance: f64,
        heuristic: H,
    ) -> Relaxation
    where
        H: FnOnce() -> f64,
    {
        match self.records.entry(node) {
            Entry::Vacant(slot) => {
                let h = heuristic();
                slot.insert(SearchRecord {
                    best_cost: tentative_cost,
                    heuristic: h,
                    parent: Some(parent),
                    in_closed_set: false,
                });
                Relaxation::Discovered {
                    score: tentative_cost + h,
                }
            }
            Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                if record.in_closed_set {
                    if tentative_cost < record.best_cost - tolerance {
                        Relaxation::ClosedImproved {
                            closed_cost: record.best_cost,
                        }
                    } else {
                        Relaxation::Unchanged
                    }
                } else if tentative_cost < record.best_cost {
                    record.best_cost = tentative_cost;
                    record.parent = Some(parent);
                    Relaxation::Improved {
                        score: record.a_star_score(),
                    }
                } else {
                    Relaxation::Unchanged
                }
            }
        }
    }
}
