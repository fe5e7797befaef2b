//! The partitioning engine: the strategy abstraction, its three
//! variants, and the accounting every variant shares.
//!
//! The stream processor holds one strategy behind [`Partitioner`] for
//! the whole run, selected once at configuration time. Graph state is
//! passed by reference into every call that needs it; a strategy owns
//! nothing but its balance counters and trigger accumulators.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::config::{RunConfig, StrategyKind};
use crate::graph::InteractionGraph;
use crate::partition::assignment::Assignment;
use crate::types::{Timestamp, VertexId};

pub mod assignment;
pub mod hash;
pub mod locality;
pub mod offline;

pub use hash::HashPartitioner;
pub use locality::LocalityPartitioner;
pub use offline::{BalancedCut, GreedyGrowthCut, OfflinePartitioner};

/// A dynamic partitioning strategy.
///
/// All variants share the same capability set: incremental assignment of
/// newly observed vertices, the repartition-trigger decision, full
/// repartitioning, and cut/movement/balance accounting.
pub trait Partitioner {
    /// Strategy identifier used for logging and output file naming.
    fn name(&self) -> &'static str;

    /// Assigns a partition to every vertex in `involved` that the
    /// vector does not cover yet, appending entries until the vector
    /// covers the highest involved id. Never reassigns an existing
    /// entry; updates the balance counters for every appended vertex.
    fn assign_partition(
        &mut self,
        graph: &InteractionGraph,
        assignment: &mut Assignment,
        involved: &BTreeSet<VertexId>,
        nparts: u32,
    );

    /// Decides, once per block boundary, whether a full repartition
    /// should run now. `last_access_was_cross_partition` is the
    /// cross/local status of the most recent edge access.
    fn trigger_partitioning(
        &mut self,
        timestamp: Timestamp,
        last_access_was_cross_partition: bool,
    ) -> bool;

    /// Recomputes a full assignment for every vertex currently known to
    /// the graph and rebuilds the balance counters from it.
    fn partition(&mut self, graph: &InteractionGraph, nparts: u32) -> Assignment;

    /// Current per-partition vertex counts.
    fn balance(&self) -> &[u64];

    /// Counts the edges whose endpoints land in different partitions
    /// under `assignment`, and returns the assignment histogram beside
    /// the count. The cut is the number of distinct cross edges, not
    /// edge accesses.
    fn calculate_edge_cut(
        &self,
        graph: &InteractionGraph,
        assignment: &Assignment,
    ) -> (u64, Vec<u64>) {
        assert!(
            assignment.len() as u64 >= graph.vertex_count(),
            "assignment vector covers {} vertices but the graph has {}",
            assignment.len(),
            graph.vertex_count()
        );
        let mut cut = 0u64;
        for (from, to, _) in graph.edges() {
            if assignment.partition_of(from) != assignment.partition_of(to) {
                cut += 1;
            }
        }
        (cut, assignment.histogram(self.balance().len()))
    }

    /// Number of vertices present in both vectors whose partition
    /// changed. Vertices introduced since the old vector was taken do
    /// not count as movements.
    fn calculate_movements_repartition(&self, old: &Assignment, new: &Assignment) -> u64 {
        old.iter().zip(new.iter()).filter(|(a, b)| a != b).count() as u64
    }
}

/// Builds the strategy selected by the run configuration.
pub fn build_partitioner(cfg: &RunConfig) -> Box<dyn Partitioner> {
    match cfg.strategy {
        StrategyKind::Hash => Box::new(HashPartitioner::new(cfg.nparts)),
        StrategyKind::Locality => {
            Box::new(LocalityPartitioner::new(cfg.nparts, cfg.locality.clone()))
        }
        StrategyKind::Offline => {
            Box::new(OfflinePartitioner::new(cfg.nparts, cfg.offline.clone()))
        }
    }
}

/// Range of vertex ids an incremental assignment must append: from the
/// current vector length through the highest involved id. `None` when
/// the vector already covers every involved vertex.
///
/// Ids inside the range that are not themselves in `involved` are still
/// graph vertices (the id space is dense), so they get assigned too.
pub(crate) fn unassigned_range(
    assignment: &Assignment,
    involved: &BTreeSet<VertexId>,
) -> Option<RangeInclusive<VertexId>> {
    let top = *involved.iter().next_back()?;
    let start = assignment.len() as VertexId;
    (top >= start).then_some(start..=top)
}
