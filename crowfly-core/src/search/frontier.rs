//! Open set ordered by A* score
//!
//! Entries are immutable snapshots taken at push time. A node may be queued
//! several times under different scores; superseded entries are skipped
//! when popped instead of being removed from the heap.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
pub(crate) struct FrontierEntry {
    /// cost + heuristic at push time
    pub score: f64,
    pub node: u32,
    seq: u64,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; equal scores pop in insertion order
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Default)]
pub(crate) struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    next_seq: u64,
    max_len: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::with_capacity(1024),
            next_seq: 0,
            max_len: 0,
        }
    }

    pub fn push(&mut self, node: u32, score: f64) {
        self.heap.push(FrontierEntry {
            score,
            node,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        self.max_len = self.max_len.max(self.heap.len());
    }

    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.heap.pop()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Total pushes so far
    pub fn pushes(&self) -> u64 {
        self.next_seq
    }

    /// High-water mark of queued entries
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}
