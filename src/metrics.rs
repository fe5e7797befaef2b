//! The metrics stream: one record per line, appended in strict event
//! order. Records already flushed before a fatal error remain valid.

use std::io::Write;

use crate::error::Result;
use crate::types::Timestamp;

/// Appends REPARTITION and POINT records to an output stream.
///
/// ```text
/// REPARTITION <ts> <vertices> <edges> <movements> <edge_cut> <balance..>
/// POINT <cross> <local> <ts> <balance..>
/// ```
#[derive(Debug)]
pub struct MetricsWriter<W: Write> {
    out: W,
}

impl<W: Write> MetricsWriter<W> {
    /// Wraps an output stream.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Emits a REPARTITION record.
    pub fn repartition(
        &mut self,
        timestamp: Timestamp,
        vertices: u64,
        edges: u64,
        movements: u64,
        edge_cut: u64,
        balance: &[u64],
    ) -> Result<()> {
        write!(
            self.out,
            "REPARTITION {timestamp} {vertices} {edges} {movements} {edge_cut}"
        )?;
        for b in balance {
            write!(self.out, " {b}")?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Emits a POINT record. `local` is `total - cross`.
    pub fn point(
        &mut self,
        cross: u64,
        local: u64,
        timestamp: Timestamp,
        balance: &[u64],
    ) -> Result<()> {
        write!(self.out, "POINT {cross} {local} {timestamp}")?;
        for b in balance {
            write!(self.out, " {b}")?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Flushes the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Unwraps the output stream, e.g. to inspect an in-memory buffer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Conventional metrics file name for a run:
/// `edge_cut_evolution_partitions_<P>_period_<T>_<strategy>.txt`.
pub fn default_output_name(nparts: u32, log_period: u64, strategy: &str) -> String {
    format!("edge_cut_evolution_partitions_{nparts}_period_{log_period}_{strategy}.txt")
}
