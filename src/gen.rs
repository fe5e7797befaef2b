//! Deterministic synthetic event-log generator.
//!
//! Produces logs with a skewed access pattern: a small hot set of
//! accounts receives most of the traffic, which is what makes locality
//! strategies interesting to evaluate. Output is reproducible for a
//! fixed seed.

use std::io::Write;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::error::Result;
use crate::types::VertexId;

/// Shape of a generated log.
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Size of the account id space (ids `1..=accounts`).
    pub accounts: u64,
    /// Number of block boundaries to emit.
    pub blocks: u64,
    /// Transactions per block.
    pub txs_per_block: u64,
    /// Upper bound on calls per transaction (at least 1).
    pub max_calls_per_tx: u64,
    /// Fraction of accounts forming the hot set.
    pub hot_fraction: f64,
    /// Probability an endpoint is drawn from the hot set.
    pub hot_bias: f64,
    /// Timestamp increment between consecutive blocks.
    pub timestamp_step: u64,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            accounts: 100,
            blocks: 50,
            txs_per_block: 20,
            max_calls_per_tx: 4,
            hot_fraction: 0.1,
            hot_bias: 0.8,
            timestamp_step: 100,
        }
    }
}

/// Summary of a generated log.
#[derive(Debug, Clone, Serialize)]
pub struct GenSummary {
    /// Lines written, including the genesis record.
    pub lines: u64,
    /// Block boundaries written.
    pub blocks: u64,
    /// Transactions written.
    pub transactions: u64,
    /// Account id space used.
    pub accounts: u64,
}

/// Seeded log generator.
pub struct LogGenerator {
    rng: ChaCha8Rng,
}

impl LogGenerator {
    /// Creates a generator; the same seed yields the same log.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn pick_account(&mut self, cfg: &GenConfig) -> VertexId {
        let hot = ((cfg.accounts as f64 * cfg.hot_fraction).ceil() as u64).max(1);
        if self.rng.gen_bool(cfg.hot_bias.clamp(0.0, 1.0)) {
            self.rng.gen_range(1..=hot)
        } else {
            self.rng.gen_range(1..=cfg.accounts)
        }
    }

    /// Writes a complete log to `out`.
    pub fn write_log<W: Write>(&mut self, out: &mut W, cfg: &GenConfig) -> Result<GenSummary> {
        assert!(cfg.accounts > 0, "account space must not be empty");
        assert!(cfg.max_calls_per_tx > 0, "transactions need at least one call");
        let mut lines = 0u64;
        let mut transactions = 0u64;

        let first = self.pick_account(cfg);
        writeln!(out, "G {first}")?;
        lines += 1;

        let mut timestamp = 1_000u64;
        for block in 0..cfg.blocks {
            for _ in 0..cfg.txs_per_block {
                let author = self.pick_account(cfg);
                let ncalls = self.rng.gen_range(1..=cfg.max_calls_per_tx);
                // Call type 3 carries no value token; type 1 does.
                let call_type = if self.rng.gen_bool(0.5) { 3 } else { 1 };
                let mut line = format!("T {author} 0 {call_type} {ncalls}");
                for _ in 0..ncalls {
                    let to = self.pick_account(cfg);
                    let weight = self.rng.gen_range(1..=5u64);
                    if self.rng.gen_bool(0.6) {
                        line.push_str(&format!(" 1 {to}"));
                    } else {
                        let from = self.pick_account(cfg);
                        line.push_str(&format!(" 2 {from} {to}"));
                    }
                    if call_type <= 2 {
                        let value = self.rng.gen_range(0..1_000u64);
                        line.push_str(&format!(" {value}"));
                    }
                    line.push_str(&format!(" {weight}"));
                }
                writeln!(out, "{line}")?;
                lines += 1;
                transactions += 1;
            }
            writeln!(out, "B {block} {timestamp}")?;
            lines += 1;
            timestamp += cfg.timestamp_step;
        }

        Ok(GenSummary {
            lines,
            blocks: cfg.blocks,
            transactions,
            accounts: cfg.accounts,
        })
    }
}
