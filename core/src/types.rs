use std::fmt;
use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::PLACEHOLDER_BYTE;

/// 1-based identity of a tributary (STS-1) stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(pub usize);

impl SourceId {
    /// Identity of the source feeding slot `index` of every round.
    pub fn from_index(index: usize) -> Self {
        SourceId(index + 1)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source {}", self.0)
    }
}

/// Message carried on a source channel.
///
/// Completion is an explicit message: a channel that disconnects without
/// `EndOfStream` is a failed producer, not a finished one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamItem {
    Byte(u8),
    EndOfStream,
}

/// One position of the combined (STS-3) sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    /// A real byte taken from an active source.
    Present(u8),
    /// Padding for a source that already reached end of stream.
    Absent,
}

impl Slot {
    pub fn is_present(self) -> bool {
        matches!(self, Slot::Present(_))
    }

    /// Legacy wire rendering: `Absent` collapses onto the zero placeholder.
    pub fn to_wire(self) -> u8 {
        match self {
            Slot::Present(b) => b,
            Slot::Absent => PLACEHOLDER_BYTE,
        }
    }

    /// Legacy wire parsing. A zero byte is indistinguishable from padding.
    pub fn from_wire(b: u8) -> Self {
        if b == PLACEHOLDER_BYTE {
            Slot::Absent
        } else {
            Slot::Present(b)
        }
    }
}

/// Unified multiplexer error.
/// - Every I/O failure carries the `SourceId` it belongs to, so there is no blanket `From<io::Error>`.
/// - Messages are stable enough for logs and CLI output.
#[derive(Debug, Error)]
pub enum MuxError {
    /// Backing input could not be opened.
    #[error("{id} unavailable: {error}")]
    SourceUnavailable {
        id: SourceId,
        #[source]
        error: io::Error,
    },

    /// Read failed for a reason other than end of input.
    #[error("{id} read failure: {error}")]
    SourceReadFailure {
        id: SourceId,
        #[source]
        error: io::Error,
    },

    /// Combined sequence length is not a whole number of rounds.
    #[error("protocol invariant violated: combined length {len} is not a multiple of {width}")]
    ProtocolInvariantViolation { len: usize, width: usize },

    /// A source produced nothing within the per-fetch deadline.
    #[error("{id} stalled in round {round} (no item within {timeout:?})")]
    SourceStalled {
        id: SourceId,
        round: u64,
        timeout: Duration,
    },

    /// A source channel closed without an end-of-stream message.
    #[error("{id} abandoned its channel in round {round}")]
    SourceAbandoned { id: SourceId, round: u64 },

    /// Writing a recovered stream failed.
    #[error("persisting {id} failed: {error}")]
    Persist {
        id: SourceId,
        #[source]
        error: io::Error,
    },

    /// Invalid configuration or wiring.
    #[error("configuration error: {0}")]
    Config(String),

    /// Channel plumbing failure.
    #[error("pipeline error: {0}")]
    Pipeline(&'static str),
}

impl MuxError {
    /// Source the error is attributed to, if any.
    pub fn source_id(&self) -> Option<SourceId> {
        match self {
            MuxError::SourceUnavailable { id, .. }
            | MuxError::SourceReadFailure { id, .. }
            | MuxError::SourceStalled { id, .. }
            | MuxError::SourceAbandoned { id, .. }
            | MuxError::Persist { id, .. } => Some(*id),
            _ => None,
        }
    }
}

pub type Result<T, E = MuxError> = std::result::Result<T, E>;
