//! sts-mux-core
//!
//! Simulation of a SONET-style 3:1 byte-interleaving multiplexer: three STS-1
//! byte streams are read concurrently, interleaved round by round into one
//! STS-3 sequence, then de-multiplexed and checked against the originals.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod config;
pub mod types;
pub mod utils;

pub mod telemetry;

// Stream layers
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::MuxConfig;
    pub use crate::stream::{
        reconstruct, reconstruct_wire, CombinedSequence, Multiplexer, MuxRun, OutputSink,
        RecoveredStreams, SharedBuffer, SourceInput, VerifyReport,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{MuxError, Slot, SourceId, StreamItem};
}
