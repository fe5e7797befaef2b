//! The replay state machine.
//!
//! Owns the graph, the assignment vector, and the access counters for
//! the duration of a run, and drives the partitioner through the
//! block-boundary trigger protocol. States move `Uninitialized →
//! Running → Terminated`, never backward.

use std::collections::BTreeSet;
use std::io::Write;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::error::{Result, SimError};
use crate::graph::InteractionGraph;
use crate::metrics::MetricsWriter;
use crate::partition::assignment::Assignment;
use crate::partition::{build_partitioner, Partitioner};
use crate::stream::event::{Call, Event};
use crate::types::{Timestamp, VertexId, ROOT_VERTEX};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Uninitialized,
    Running,
    Terminated,
}

/// Final report of a replay run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Strategy that drove the run.
    pub strategy: String,
    /// Partition count.
    pub partitions: u32,
    /// Events processed.
    pub events: u64,
    /// Vertices known to the graph at end of input.
    pub vertices: u64,
    /// Distinct directed edges at end of input.
    pub edges: u64,
    /// Edges touched by transactions over the whole run.
    pub total_edge_access: u64,
    /// Touched edges whose endpoints sat in different partitions.
    pub cross_edge_access: u64,
    /// Full repartitions performed.
    pub repartitions: u64,
    /// POINT records flushed.
    pub points: u64,
    /// Final per-partition vertex counts.
    pub balance: Vec<u64>,
}

impl RunSummary {
    /// Fraction of edge accesses that crossed partitions.
    pub fn cross_access_rate(&self) -> f64 {
        if self.total_edge_access == 0 {
            0.0
        } else {
            self.cross_edge_access as f64 / self.total_edge_access as f64
        }
    }
}

/// Replays an ordered event sequence against the partitioning engine,
/// emitting metrics records along the way.
pub struct StreamProcessor<W: Write> {
    cfg: RunConfig,
    graph: InteractionGraph,
    assignment: Assignment,
    partitioner: Box<dyn Partitioner>,
    metrics: MetricsWriter<W>,
    state: RunState,
    total_edge_access: u64,
    cross_edge_access: u64,
    last_access_was_cross: bool,
    flush_baseline: Option<Timestamp>,
    last_timestamp: Option<Timestamp>,
    events: u64,
    cumulative_access: u64,
    cumulative_cross: u64,
    repartitions: u64,
    points: u64,
}

impl<W: Write> StreamProcessor<W> {
    /// Builds a processor with the strategy the configuration selects.
    pub fn new(cfg: RunConfig, out: W) -> Self {
        let partitioner = build_partitioner(&cfg);
        Self::with_partitioner(cfg, partitioner, out)
    }

    /// Builds a processor around a caller-supplied strategy.
    pub fn with_partitioner(cfg: RunConfig, partitioner: Box<dyn Partitioner>, out: W) -> Self {
        Self {
            cfg,
            graph: InteractionGraph::new(),
            assignment: Assignment::new(),
            partitioner,
            metrics: MetricsWriter::new(out),
            state: RunState::Uninitialized,
            total_edge_access: 0,
            cross_edge_access: 0,
            last_access_was_cross: false,
            flush_baseline: None,
            last_timestamp: None,
            events: 0,
            cumulative_access: 0,
            cumulative_cross: 0,
            repartitions: 0,
            points: 0,
        }
    }

    /// The graph built so far.
    pub fn graph(&self) -> &InteractionGraph {
        &self.graph
    }

    /// The current assignment vector.
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Drives an event source to exhaustion and returns the summary.
    pub fn run<I>(&mut self, events: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<Event>>,
    {
        for event in events {
            self.process(event?)?;
        }
        self.state = RunState::Terminated;
        self.metrics.flush()?;
        info!(
            events = self.events,
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            repartitions = self.repartitions,
            "replay.finished"
        );
        Ok(self.summary())
    }

    /// Applies a single event.
    pub fn process(&mut self, event: Event) -> Result<()> {
        self.events += 1;
        match event {
            Event::Genesis { vertex } => self.on_genesis(vertex),
            Event::Block { timestamp } => self.on_block(timestamp),
            Event::Transaction { author, calls } => self.on_transaction(author, &calls),
        }
    }

    /// Snapshot of the run counters.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            strategy: self.partitioner.name().to_string(),
            partitions: self.cfg.nparts,
            events: self.events,
            vertices: self.graph.vertex_count(),
            edges: self.graph.edge_count(),
            total_edge_access: self.cumulative_access,
            cross_edge_access: self.cumulative_cross,
            repartitions: self.repartitions,
            points: self.points,
            balance: self.partitioner.balance().to_vec(),
        }
    }

    fn on_genesis(&mut self, vertex: VertexId) -> Result<()> {
        if self.state != RunState::Uninitialized {
            return Err(SimError::Protocol("duplicate genesis event".into()));
        }
        self.graph.add_or_accumulate(ROOT_VERTEX, vertex, 1);
        let involved: BTreeSet<VertexId> = [ROOT_VERTEX, vertex].into_iter().collect();
        self.partitioner
            .assign_partition(&self.graph, &mut self.assignment, &involved, self.cfg.nparts);
        self.state = RunState::Running;
        debug!(vertex, "replay.genesis");
        Ok(())
    }

    fn on_block(&mut self, timestamp: Timestamp) -> Result<()> {
        if self.flush_baseline.is_none() {
            self.flush_baseline = Some(timestamp);
        }
        if self
            .partitioner
            .trigger_partitioning(timestamp, self.last_access_was_cross)
        {
            self.repartition(timestamp)?;
        }
        if let Some(last) = self.last_timestamp {
            if timestamp < last {
                return Err(SimError::Protocol(format!(
                    "timestamp went backward: {timestamp} after {last}"
                )));
            }
        }
        self.last_timestamp = Some(timestamp);

        let baseline = self.flush_baseline.unwrap_or(timestamp);
        if timestamp - baseline > self.cfg.log_period {
            debug_assert!(self.total_edge_access >= self.cross_edge_access);
            let local = self.total_edge_access - self.cross_edge_access;
            self.metrics.point(
                self.cross_edge_access,
                local,
                timestamp,
                self.partitioner.balance(),
            )?;
            self.points += 1;
            debug!(
                timestamp,
                cross = self.cross_edge_access,
                local,
                "replay.point"
            );
            self.total_edge_access = 0;
            self.cross_edge_access = 0;
            self.flush_baseline = Some(timestamp);
        }
        Ok(())
    }

    fn repartition(&mut self, timestamp: Timestamp) -> Result<()> {
        let old = self.assignment.clone();
        let fresh = self.partitioner.partition(&self.graph, self.cfg.nparts);
        let movements = self
            .partitioner
            .calculate_movements_repartition(&old, &fresh);
        let (edge_cut, balance) = self.partitioner.calculate_edge_cut(&self.graph, &fresh);
        self.assignment = fresh;
        self.metrics.repartition(
            timestamp,
            self.graph.vertex_count(),
            self.graph.edge_count(),
            movements,
            edge_cut,
            &balance,
        )?;
        self.repartitions += 1;
        info!(timestamp, movements, edge_cut, "replay.repartition");
        Ok(())
    }

    fn on_transaction(&mut self, author: VertexId, calls: &[Call]) -> Result<()> {
        if self.state != RunState::Running {
            return Err(SimError::Protocol(
                "transaction before genesis event".into(),
            ));
        }
        let mut involved: BTreeSet<VertexId> = BTreeSet::new();
        involved.insert(author);
        let mut touched: Vec<(VertexId, VertexId)> = Vec::with_capacity(calls.len());
        for call in calls {
            self.graph
                .add_or_accumulate(call.from, call.to, call.weight);
            involved.insert(call.from);
            involved.insert(call.to);
            touched.push((call.from, call.to));
        }
        // Brand-new vertices must be assigned before their edges are
        // scored.
        self.partitioner
            .assign_partition(&self.graph, &mut self.assignment, &involved, self.cfg.nparts);
        // Encounter order matters: the trigger only ever sees the most
        // recent edge's cross/local status.
        for (from, to) in touched {
            self.total_edge_access += 1;
            self.cumulative_access += 1;
            if self.assignment.partition_of(from) != self.assignment.partition_of(to) {
                self.cross_edge_access += 1;
                self.cumulative_cross += 1;
                self.last_access_was_cross = true;
            } else {
                self.last_access_was_cross = false;
            }
        }
        Ok(())
    }
}
