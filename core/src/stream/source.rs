//! Stream source (STS-1 tributary).
//!
//! Reads its backing input one frame at a time and forwards the frame byte by
//! byte, in order, onto its own channel. End of input is reported with an
//! explicit `StreamItem::EndOfStream`.

use std::io::Read;
use std::time::{Duration, Instant};

use crossbeam::channel::Sender;
use tracing::{debug, trace};

use crate::stream::io::{self, SourceInput};
use crate::telemetry::MuxCounters;
use crate::types::{MuxError, SourceId, StreamItem};

/// What a source emitted, handed back when its worker finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStats {
    pub id: SourceId,
    /// `frames_read` / `bytes_read` only.
    pub counters: MuxCounters,
    /// CRC-32 of every byte sent.
    pub checksum: u32,
    pub read_time: Duration,
}

impl SourceStats {
    pub fn bytes_sent(&self) -> u64 {
        self.counters.bytes_read
    }

    pub fn frames_read(&self) -> u64 {
        self.counters.frames_read
    }
}

pub struct StreamSource {
    id: SourceId,
    reader: Box<dyn Read + Send>,
    frame_size: usize,
}

impl std::fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSource")
            .field("id", &self.id)
            .field("frame_size", &self.frame_size)
            .finish_non_exhaustive()
    }
}

impl StreamSource {
    /// Bind a source to its backing input.
    pub fn open(id: SourceId, input: SourceInput, frame_size: usize) -> Result<Self, MuxError> {
        if frame_size == 0 {
            return Err(MuxError::Config("frame_size must be at least 1".into()));
        }
        debug!(%id, input = %input.describe(), frame_size, "opening source");
        let reader = io::open_input(id, input)?;
        Ok(Self { id, reader, frame_size })
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Drain the input into `out`, then send `EndOfStream`.
    ///
    /// Blocks whenever `out` is full. Fails with `SourceReadFailure` on any
    /// read error other than end of input, and with a pipeline error if the
    /// consumer has gone away.
    pub fn run(mut self, out: Sender<StreamItem>) -> Result<SourceStats, MuxError> {
        let id = self.id;
        let mut counters = MuxCounters::default();
        let mut hasher = crc32fast::Hasher::new();
        let mut read_time = Duration::ZERO;

        loop {
            let start = Instant::now();
            let frame = io::read_frame(&mut self.reader, self.frame_size)
                .map_err(|error| MuxError::SourceReadFailure { id, error })?;
            read_time += start.elapsed();

            if frame.is_empty() {
                break;
            }

            counters.add_frame(frame.len());
            hasher.update(&frame);
            trace!(%id, frame = counters.frames_read, len = frame.len(), "dispatching frame");

            for &b in frame.iter() {
                out.send(StreamItem::Byte(b))
                    .map_err(|_| MuxError::Pipeline("source channel closed"))?;
            }

            // Short frame: input is exhausted.
            if frame.len() < self.frame_size {
                break;
            }
        }

        out.send(StreamItem::EndOfStream)
            .map_err(|_| MuxError::Pipeline("source channel closed"))?;
        debug!(%id, frames = counters.frames_read, bytes = counters.bytes_read, "end of stream");

        Ok(SourceStats {
            id,
            counters,
            checksum: hasher.finalize(),
            read_time,
        })
    }
}
