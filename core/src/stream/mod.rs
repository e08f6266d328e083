//! stream — concurrent STS-1 -> STS-3 byte interleaving and its inverse.
//!
//! Layering, leaf-first:
//! - `io`: input/output normalization and frame reads
//! - `source`: one worker per tributary, frame in, bytes out
//! - `interleaver`: round-robin consumer of all source channels
//! - `combined` / `reconstruct`: the STS-3 sequence and the de-multiplexer
//! - `verify`: round-trip checks
//! - `pipeline`: the orchestrator tying them together

pub mod io;
pub mod source;
pub mod combined;
pub mod interleaver;
pub mod reconstruct;
pub mod verify;
pub mod pipeline;

pub use io::{OutputSink, SharedBuffer, SourceInput};
pub use source::{SourceStats, StreamSource};
pub use combined::CombinedSequence;
pub use interleaver::Interleaver;
pub use reconstruct::{reconstruct, reconstruct_wire, RecoveredStream, RecoveredStreams};
pub use verify::{compare, verify, StreamCheck, VerifyReport};
pub use pipeline::{Multiplexer, MuxRun};
