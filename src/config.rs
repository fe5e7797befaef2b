//! Run configuration.
//!
//! A configuration is fixed for the whole run: the partition count, the
//! logging period, and the strategy (selected once, never swapped
//! mid-stream) plus the tuning knobs of the adaptive strategies.

use std::fmt;

use crate::error::{Result, SimError};

/// Which partitioning strategy drives the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Fixed `id % nparts` assignment; never repartitions.
    Hash,
    /// Greedy neighbor-locality assignment with a cross-access-rate
    /// repartition trigger.
    Locality,
    /// Balance-driven incremental assignment with periodic full
    /// repartitions delegated to an offline balanced-cut engine.
    Offline,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Hash => "hash",
            StrategyKind::Locality => "locality",
            StrategyKind::Offline => "offline",
        };
        f.write_str(name)
    }
}

/// Tuning knobs for the streaming-locality strategy.
#[derive(Debug, Clone)]
pub struct LocalityConfig {
    /// Number of recent block-boundary cross/local observations the
    /// trigger looks at.
    pub window: usize,
    /// Cross fraction of a full window at or above which a repartition
    /// fires.
    pub cross_threshold: f64,
    /// Minimum time units between repartitions.
    pub cooldown: u64,
}

impl Default for LocalityConfig {
    fn default() -> Self {
        Self {
            window: 64,
            cross_threshold: 0.5,
            cooldown: 1_000,
        }
    }
}

/// Tuning knobs for the offline-balanced strategy.
#[derive(Debug, Clone)]
pub struct OfflineConfig {
    /// Time units between full repartitions.
    pub interval: u64,
    /// Allowed per-partition overshoot above the ideal size during a
    /// full repartition, as a fraction (0.05 = 5%).
    pub balance_slack: f64,
    /// Boundary-refinement sweeps the engine runs after region growing.
    pub refine_passes: usize,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            interval: 10_000,
            balance_slack: 0.05,
            refine_passes: 2,
        }
    }
}

/// Full configuration of a replay run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of partitions `P`. Fixed for the run; must be ≥ 1.
    pub nparts: u32,
    /// Time units between POINT metric flushes.
    pub log_period: u64,
    /// Strategy driving assignment and repartition decisions.
    pub strategy: StrategyKind,
    /// Streaming-locality knobs.
    pub locality: LocalityConfig,
    /// Offline-balanced knobs.
    pub offline: OfflineConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            nparts: 4,
            log_period: 1_000,
            strategy: StrategyKind::Hash,
            locality: LocalityConfig::default(),
            offline: OfflineConfig::default(),
        }
    }
}

impl RunConfig {
    /// Builds a configuration with default tuning knobs.
    pub fn new(nparts: u32, log_period: u64, strategy: StrategyKind) -> Self {
        Self {
            nparts,
            log_period,
            strategy,
            ..Self::default()
        }
    }

    /// Rejects configurations the engine treats as programming errors,
    /// so they surface before any event is processed.
    pub fn validate(&self) -> Result<()> {
        if self.nparts == 0 {
            return Err(SimError::InvalidArgument(
                "partition count must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.locality.cross_threshold) {
            return Err(SimError::InvalidArgument(
                "cross threshold must lie in [0, 1]".into(),
            ));
        }
        if self.locality.window == 0 {
            return Err(SimError::InvalidArgument(
                "locality window must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
