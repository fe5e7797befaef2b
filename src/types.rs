//! Core identifier and scalar types shared across the harness.

/// Dense, non-negative vertex identifier. Ids are never reused or
/// deleted; the vertex space only grows over a run.
pub type VertexId = u64;

/// Partition identifier in `0..nparts`.
pub type PartitionId = u32;

/// Accumulated edge weight. Monotonically non-decreasing.
pub type Weight = u64;

/// Block timestamp as carried by the event log.
pub type Timestamp = u64;

/// The distinguished root vertex created implicitly by the Genesis
/// event.
pub const ROOT_VERTEX: VertexId = 0;
