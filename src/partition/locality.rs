//! Streaming locality-aware partitioning.
//!
//! Incremental assignment is a greedy pass in the
//! linear-deterministic-greedy family: a new vertex goes to the
//! partition holding the most weight of its already-assigned neighbors,
//! discounted by how full that partition is. The repartition trigger
//! watches a rolling window of the per-block cross/local observations
//! and fires when the cross fraction stays high once a cooldown has
//! elapsed.

use std::collections::{BTreeSet, VecDeque};

use crate::config::LocalityConfig;
use crate::graph::InteractionGraph;
use crate::partition::assignment::{Assignment, BalanceCounters};
use crate::partition::{unassigned_range, Partitioner};
use crate::types::{PartitionId, Timestamp, VertexId};

/// Communication-aware online strategy.
#[derive(Debug)]
pub struct LocalityPartitioner {
    balance: BalanceCounters,
    cfg: LocalityConfig,
    window: VecDeque<bool>,
    cross_in_window: usize,
    last_repartition: Option<Timestamp>,
}

impl LocalityPartitioner {
    /// Creates the strategy for `nparts` partitions with the given
    /// trigger knobs.
    pub fn new(nparts: u32, cfg: LocalityConfig) -> Self {
        assert!(cfg.window > 0, "trigger window must be at least 1");
        Self {
            balance: BalanceCounters::new(nparts),
            cfg,
            window: VecDeque::new(),
            cross_in_window: 0,
            last_repartition: None,
        }
    }

    /// Cross fraction of the current trigger window.
    pub fn window_cross_rate(&self) -> f64 {
        if self.window.is_empty() {
            0.0
        } else {
            self.cross_in_window as f64 / self.window.len() as f64
        }
    }

    fn pick_partition(
        &self,
        graph: &InteractionGraph,
        assignment: &Assignment,
        id: VertexId,
        nparts: u32,
    ) -> PartitionId {
        let mut locality = vec![0u64; nparts as usize];
        let mut has_assigned_neighbor = false;
        for (n, w) in graph.neighbors(id) {
            if n == id {
                continue;
            }
            if let Some(p) = assignment.get(n) {
                // A zero-weight edge still signals contact.
                locality[p as usize] += w.max(1);
                has_assigned_neighbor = true;
            }
        }
        if !has_assigned_neighbor {
            return self.balance.least_loaded();
        }
        // Expected per-partition share once this vertex is placed; the
        // discount goes negative once a partition overshoots it.
        let capacity = (assignment.len() as f64 + 1.0) / f64::from(nparts) + 1.0;
        let counts = self.balance.counts();
        let mut best: Option<(f64, PartitionId)> = None;
        for (p, &pull) in locality.iter().enumerate() {
            if pull == 0 {
                continue;
            }
            let score = pull as f64 * (1.0 - counts[p] as f64 / capacity);
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, p as PartitionId));
            }
        }
        match best {
            Some((score, p)) if score > 0.0 => p,
            _ => self.balance.least_loaded(),
        }
    }
}

impl Partitioner for LocalityPartitioner {
    fn name(&self) -> &'static str {
        "locality"
    }

    fn assign_partition(
        &mut self,
        graph: &InteractionGraph,
        assignment: &mut Assignment,
        involved: &BTreeSet<VertexId>,
        nparts: u32,
    ) {
        let Some(range) = unassigned_range(assignment, involved) else {
            return;
        };
        for id in range {
            let p = self.pick_partition(graph, assignment, id, nparts);
            assignment.push(p);
            self.balance.record(p);
        }
    }

    fn trigger_partitioning(
        &mut self,
        timestamp: Timestamp,
        last_access_was_cross_partition: bool,
    ) -> bool {
        // The first block boundary anchors the cooldown.
        let anchor = *self.last_repartition.get_or_insert(timestamp);
        self.window.push_back(last_access_was_cross_partition);
        if last_access_was_cross_partition {
            self.cross_in_window += 1;
        }
        if self.window.len() > self.cfg.window {
            if self.window.pop_front() == Some(true) {
                self.cross_in_window -= 1;
            }
        }
        if self.window.len() < self.cfg.window {
            return false;
        }
        let elapsed = timestamp.saturating_sub(anchor);
        if self.window_cross_rate() >= self.cfg.cross_threshold && elapsed >= self.cfg.cooldown {
            self.window.clear();
            self.cross_in_window = 0;
            self.last_repartition = Some(timestamp);
            true
        } else {
            false
        }
    }

    fn partition(&mut self, graph: &InteractionGraph, nparts: u32) -> Assignment {
        // Replay the streaming scorer over the whole id space; the
        // balance counters track the vector being rebuilt.
        let mut fresh = Assignment::new();
        self.balance.reset();
        for id in 0..graph.vertex_count() {
            let p = self.pick_partition(graph, &fresh, id, nparts);
            fresh.push(p);
            self.balance.record(p);
        }
        fresh
    }

    fn balance(&self) -> &[u64] {
        self.balance.counts()
    }
}
