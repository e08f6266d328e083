//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for a multiplexer run.
//!
//! Workers keep local counters and hand them back on join; the orchestrator
//! merges them and freezes the result into a `TelemetrySnapshot`.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
