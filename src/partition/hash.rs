//! Deterministic hash partitioning: the baseline strategy.
//!
//! Vertex→partition is a fixed function of the id (`id % nparts`), so a
//! hash partition never benefits from repartitioning — the trigger
//! always declines, and a forced full repartition reproduces the same
//! assignment with zero movements.

use std::collections::BTreeSet;

use crate::graph::InteractionGraph;
use crate::partition::assignment::{Assignment, BalanceCounters};
use crate::partition::{unassigned_range, Partitioner};
use crate::types::{PartitionId, Timestamp, VertexId};

/// `id % nparts` assignment.
#[derive(Debug)]
pub struct HashPartitioner {
    balance: BalanceCounters,
}

impl HashPartitioner {
    /// Creates the baseline strategy for `nparts` partitions.
    pub fn new(nparts: u32) -> Self {
        Self {
            balance: BalanceCounters::new(nparts),
        }
    }
}

impl Partitioner for HashPartitioner {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn assign_partition(
        &mut self,
        _graph: &InteractionGraph,
        assignment: &mut Assignment,
        involved: &BTreeSet<VertexId>,
        nparts: u32,
    ) {
        let Some(range) = unassigned_range(assignment, involved) else {
            return;
        };
        for id in range {
            let p = (id % u64::from(nparts)) as PartitionId;
            assignment.push(p);
            self.balance.record(p);
        }
    }

    fn trigger_partitioning(&mut self, _timestamp: Timestamp, _last_cross: bool) -> bool {
        false
    }

    fn partition(&mut self, graph: &InteractionGraph, nparts: u32) -> Assignment {
        let fresh = Assignment::from_vec(
            (0..graph.vertex_count())
                .map(|id| (id % u64::from(nparts)) as PartitionId)
                .collect(),
        );
        self.balance.rebuild_from(&fresh);
        fresh
    }

    fn balance(&self) -> &[u64] {
        self.balance.counts()
    }
}
