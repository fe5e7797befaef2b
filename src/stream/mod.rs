//! Event stream: the typed event model, the log-line decoder, and the
//! processor that replays events against the partitioning engine.

pub mod event;
pub mod processor;

pub use event::{Call, Event, EventReader};
pub use processor::{RunSummary, StreamProcessor};
