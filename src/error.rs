//! Crate-wide error type.
//!
//! Every fatal condition in the harness is a [`SimError`]: the run is a
//! deterministic single pass over a fixed log, so nothing is retried —
//! errors abort the replay and surface to the operator.

use std::io;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that abort a replay run.
#[derive(Debug, Error)]
pub enum SimError {
    /// I/O failure on the input log or the metrics stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A log line that does not match the event grammar.
    #[error("parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line number in the input log.
        line: u64,
        /// What was wrong with the line.
        reason: String,
    },
    /// Event ordering violated an invariant of the replay state machine.
    #[error("protocol violation: {0}")]
    Protocol(String),
    /// Rejected run configuration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SimError {
    pub(crate) fn parse(line: u64, reason: impl Into<String>) -> Self {
        SimError::Parse {
            line,
            reason: reason.into(),
        }
    }
}
