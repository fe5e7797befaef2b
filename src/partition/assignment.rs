//! The partition assignment store: the vertex→partition vector and the
//! per-partition size counters that travel with it.

use crate::types::{PartitionId, VertexId};

/// Vertex→partition mapping, indexed by vertex id.
///
/// The vector's length is always at least `max vertex id seen + 1`.
/// Incremental assignment only appends; a full repartition replaces the
/// whole vector atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment(Vec<PartitionId>);

impl Assignment {
    /// Creates an empty assignment vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fully recomputed vector, e.g. the output of a full
    /// repartition.
    pub fn from_vec(parts: Vec<PartitionId>) -> Self {
        Self(parts)
    }

    /// Number of assigned vertices.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no vertex has been assigned yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Partition of `v`, or `None` when `v` has not been assigned yet.
    pub fn get(&self, v: VertexId) -> Option<PartitionId> {
        self.0.get(v as usize).copied()
    }

    /// Partition of `v`. Panics when `v` is unassigned; callers on the
    /// metrics path must have assigned every touched vertex first.
    pub fn partition_of(&self, v: VertexId) -> PartitionId {
        self.0[v as usize]
    }

    /// Appends the assignment for the next vertex id (the id equal to
    /// the current length).
    pub fn push(&mut self, p: PartitionId) {
        self.0.push(p);
    }

    /// Iterates assignments in vertex-id order.
    pub fn iter(&self) -> impl Iterator<Item = PartitionId> + '_ {
        self.0.iter().copied()
    }

    /// Histogram of the vector over `nparts` partitions.
    pub fn histogram(&self, nparts: usize) -> Vec<u64> {
        let mut counts = vec![0u64; nparts];
        for &p in &self.0 {
            counts[p as usize] += 1;
        }
        counts
    }
}

/// Per-partition vertex counts, owned by the partitioner and kept in
/// lockstep with the assignment vector.
#[derive(Debug, Clone)]
pub struct BalanceCounters(Vec<u64>);

impl BalanceCounters {
    /// Zeroed counters for `nparts` partitions.
    pub fn new(nparts: u32) -> Self {
        assert!(nparts > 0, "partition count must be at least 1");
        Self(vec![0; nparts as usize])
    }

    /// Records one newly assigned vertex.
    pub fn record(&mut self, p: PartitionId) {
        self.0[p as usize] += 1;
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        self.0.iter_mut().for_each(|c| *c = 0);
    }

    /// Recomputes the counters wholesale from a replaced vector.
    pub fn rebuild_from(&mut self, assignment: &Assignment) {
        self.reset();
        for p in assignment.iter() {
            self.0[p as usize] += 1;
        }
    }

    /// Current counts, indexed by partition id.
    pub fn counts(&self) -> &[u64] {
        &self.0
    }

    /// Partition with the fewest vertices; ties go to the lowest id.
    pub fn least_loaded(&self) -> PartitionId {
        self.0
            .iter()
            .enumerate()
            .min_by_key(|&(_, c)| c)
            .map(|(p, _)| p as PartitionId)
            .expect("at least one partition")
    }
}
