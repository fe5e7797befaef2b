//! Typed events and the event-log decoder.
//!
//! The log is line-oriented and whitespace-tokenized. The positional
//! grammar lives entirely in this module; the rest of the crate only
//! ever sees typed [`Event`] values.
//!
//! ```text
//! G <vertex_id>
//! B <ignored> <timestamp>
//! T <author> <ignored> (<type> <ncalls>
//!       (<is_self:1|2> [<from>] <to> [<value if type<=2>] <weight>)*ncalls)+
//! ```

use std::io::BufRead;

use crate::error::{Result, SimError};
use crate::types::{Timestamp, VertexId, Weight};

/// One applied call inside a transaction. `from` is already resolved to
/// the author for self-originated calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    /// Calling vertex.
    pub from: VertexId,
    /// Called vertex.
    pub to: VertexId,
    /// Weight contribution of this call.
    pub weight: Weight,
}

/// A decoded event-log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Introduces the root vertex's first edge to `vertex`.
    Genesis {
        /// The vertex the root connects to.
        vertex: VertexId,
    },
    /// Block boundary; the only trigger point for repartition checks
    /// and periodic metric flushes.
    Block {
        /// Monotonically non-decreasing block timestamp.
        timestamp: Timestamp,
    },
    /// A transaction applying a list of calls to the graph.
    Transaction {
        /// Authoring vertex; involved even when the call list is empty.
        author: VertexId,
        /// Calls in log order.
        calls: Vec<Call>,
    },
}

fn field<'a>(tokens: &[&'a str], idx: usize, what: &str, line: u64) -> Result<&'a str> {
    tokens
        .get(idx)
        .copied()
        .ok_or_else(|| SimError::parse(line, format!("missing {what}")))
}

fn int_field(tokens: &[&str], idx: usize, what: &str, line: u64) -> Result<u64> {
    let tok = field(tokens, idx, what, line)?;
    tok.parse()
        .map_err(|_| SimError::parse(line, format!("bad {what} `{tok}`")))
}

/// Decodes one log line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str, line_no: u64) -> Result<Option<Event>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&tag) = tokens.first() else {
        return Ok(None);
    };
    let event = match tag {
        "G" => Event::Genesis {
            vertex: int_field(&tokens, 1, "genesis vertex id", line_no)?,
        },
        "B" => Event::Block {
            timestamp: int_field(&tokens, 2, "block timestamp", line_no)?,
        },
        "T" => parse_transaction(&tokens, line_no)?,
        other => {
            return Err(SimError::parse(
                line_no,
                format!("unknown record tag `{other}`"),
            ))
        }
    };
    Ok(Some(event))
}

fn parse_transaction(tokens: &[&str], line_no: u64) -> Result<Event> {
    let author = int_field(tokens, 1, "author id", line_no)?;
    let mut calls = Vec::new();
    // Call groups start after the two-token header.
    let mut i = 3;
    while i < tokens.len() {
        let call_type = int_field(tokens, i, "call type", line_no)?;
        i += 1;
        let num_calls = int_field(tokens, i, "call count", line_no)?;
        i += 1;
        for _ in 0..num_calls {
            let (from, to) = match field(tokens, i, "origin flag", line_no)? {
                "1" => {
                    i += 1;
                    (author, int_field(tokens, i, "callee id", line_no)?)
                }
                "2" => {
                    let from = int_field(tokens, i + 1, "caller id", line_no)?;
                    let to = int_field(tokens, i + 2, "callee id", line_no)?;
                    i += 2;
                    (from, to)
                }
                other => {
                    return Err(SimError::parse(
                        line_no,
                        format!("bad origin flag `{other}`"),
                    ))
                }
            };
            if call_type <= 2 {
                // Value-bearing call types carry an extra token.
                i += 1;
            }
            i += 1;
            let weight = int_field(tokens, i, "repetition weight", line_no)?;
            i += 1;
            calls.push(Call { from, to, weight });
        }
    }
    Ok(Event::Transaction { author, calls })
}

/// Iterator adapter decoding a reader line by line.
pub struct EventReader<R: BufRead> {
    lines: std::io::Lines<R>,
    line_no: u64,
}

impl<R: BufRead> EventReader<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_no += 1;
            match parse_line(&line, self.line_no) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
