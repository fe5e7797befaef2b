//! The weighted interaction graph built up by the replay.
//!
//! Directed edges identified by their ordered `(from, to)` pair; at most
//! one logical edge exists per pair, and re-inserting accumulates weight
//! instead of creating a parallel edge. Forward and reverse adjacency
//! are kept side by side so partitioners can walk undirected
//! neighborhoods without a scan.

use rustc_hash::FxHashMap;

use crate::types::{VertexId, Weight};

/// Mutable weighted multigraph-with-merge over dense integer vertex ids.
///
/// Vertex ids are implicitly dense: inserting an edge that touches id
/// `v` makes every id in `0..=v` a vertex of the graph, so
/// [`vertex_count`](Self::vertex_count) is always `max_id + 1`.
#[derive(Debug, Default, Clone)]
pub struct InteractionGraph {
    fwd: FxHashMap<VertexId, FxHashMap<VertexId, Weight>>,
    rev: FxHashMap<VertexId, FxHashMap<VertexId, Weight>>,
    edges: u64,
    // One past the highest id touched so far.
    vertex_watermark: u64,
}

impl InteractionGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the `(from, to)` edge with weight `weight` if absent,
    /// otherwise adds `weight` to the existing edge's weight.
    ///
    /// Implicitly widens the vertex space to cover both endpoints.
    pub fn add_or_accumulate(&mut self, from: VertexId, to: VertexId, weight: Weight) {
        let outs = self.fwd.entry(from).or_default();
        let fresh = !outs.contains_key(&to);
        *outs.entry(to).or_insert(0) += weight;
        *self.rev.entry(to).or_default().entry(from).or_insert(0) += weight;
        if fresh {
            self.edges += 1;
        }
        self.vertex_watermark = self.vertex_watermark.max(from + 1).max(to + 1);
    }

    /// Number of vertices currently known to the graph (`max_id + 1`,
    /// or zero before any edge exists).
    pub fn vertex_count(&self) -> u64 {
        self.vertex_watermark
    }

    /// Number of distinct directed edges.
    pub fn edge_count(&self) -> u64 {
        self.edges
    }

    /// Accumulated weight of the `(from, to)` edge, if it exists.
    pub fn edge_weight(&self, from: VertexId, to: VertexId) -> Option<Weight> {
        self.fwd.get(&from).and_then(|m| m.get(&to)).copied()
    }

    /// Iterates every distinct directed edge as `(from, to, weight)`.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId, Weight)> + '_ {
        self.fwd
            .iter()
            .flat_map(|(&from, outs)| outs.iter().map(move |(&to, &w)| (from, to, w)))
    }

    /// Iterates the undirected neighborhood of `v` as
    /// `(neighbor, weight)`, visiting out-edges then in-edges.
    ///
    /// A pair connected in both directions yields its neighbor twice,
    /// once per direction, which is exactly the incident weight a
    /// locality score wants to sum.
    pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = (VertexId, Weight)> + '_ {
        let out = self
            .fwd
            .get(&v)
            .into_iter()
            .flat_map(|m| m.iter().map(|(&n, &w)| (n, w)));
        let inc = self
            .rev
            .get(&v)
            .into_iter()
            .flat_map(|m| m.iter().map(|(&n, &w)| (n, w)));
        out.chain(inc)
    }

    /// Total undirected incident weight of `v`.
    pub fn degree_weight(&self, v: VertexId) -> Weight {
        self.neighbors(v).map(|(_, w)| w).sum()
    }
}
