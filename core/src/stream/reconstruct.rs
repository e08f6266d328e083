//! De-multiplexer: rebuilds the tributary streams from a combined sequence.

use std::io::Write;

use bytes::Bytes;
use tracing::debug;

use crate::constants::PLACEHOLDER_BYTE;
use crate::stream::combined::CombinedSequence;
use crate::stream::io::{self, OutputSink};
use crate::types::{MuxError, Slot, SourceId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredStream {
    pub id: SourceId,
    pub bytes: Bytes,
}

/// Recovered streams in source order (1..=N).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecoveredStreams {
    streams: Vec<RecoveredStream>,
}

impl RecoveredStreams {
    fn from_buffers(buffers: Vec<Vec<u8>>) -> Self {
        let streams = buffers
            .into_iter()
            .enumerate()
            .map(|(i, b)| RecoveredStream {
                id: SourceId::from_index(i),
                bytes: Bytes::from(b),
            })
            .collect();
        Self { streams }
    }

    pub fn get(&self, id: SourceId) -> Option<&RecoveredStream> {
        id.0.checked_sub(1).and_then(|i| self.streams.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecoveredStream> {
        self.streams.iter()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.streams.iter().map(|s| s.bytes.len()).sum()
    }

    /// Plain byte vectors in source order.
    pub fn to_vecs(&self) -> Vec<Vec<u8>> {
        self.streams.iter().map(|s| s.bytes.to_vec()).collect()
    }

    /// Write stream `j + 1` to `sinks[j]`.
    pub fn persist(&self, sinks: Vec<OutputSink>) -> Result<(), MuxError> {
        if sinks.len() != self.streams.len() {
            return Err(MuxError::Config(format!(
                "expected {} output sinks, got {}",
                self.streams.len(),
                sinks.len()
            )));
        }
        for (stream, sink) in self.streams.iter().zip(sinks) {
            let id = stream.id;
            let mut writer = io::open_output(id, sink)?;
            writer
                .write_all(&stream.bytes)
                .and_then(|_| writer.flush())
                .map_err(|error| MuxError::Persist { id, error })?;
            debug!(%id, bytes = stream.bytes.len(), "recovered stream persisted");
        }
        Ok(())
    }
}

fn check_alignment(len: usize, width: usize) -> Result<(), MuxError> {
    if width == 0 || len % width != 0 {
        return Err(MuxError::ProtocolInvariantViolation { len, width });
    }
    Ok(())
}

/// Exact reconstruction: `Present` bytes are kept, `Absent` slots dropped.
pub fn reconstruct(combined: &CombinedSequence) -> Result<RecoveredStreams, MuxError> {
    let width = combined.width();
    check_alignment(combined.len(), width)?;

    let mut buffers = vec![Vec::with_capacity(combined.rounds()); width];
    for round in combined.slots().chunks_exact(width) {
        for (j, slot) in round.iter().enumerate() {
            if let Slot::Present(b) = slot {
                buffers[j].push(*b);
            }
        }
    }

    Ok(RecoveredStreams::from_buffers(buffers))
}

/// Legacy reconstruction from raw STS-3 bytes.
///
/// Every byte equal to the placeholder is dropped, including genuine zero
/// bytes from an active source.
pub fn reconstruct_wire(data: &[u8], width: usize) -> Result<RecoveredStreams, MuxError> {
    check_alignment(data.len(), width)?;

    let mut buffers = vec![Vec::with_capacity(data.len() / width); width];
    for round in data.chunks_exact(width) {
        for (j, &b) in round.iter().enumerate() {
            if b != PLACEHOLDER_BYTE {
                buffers[j].push(b);
            }
        }
    }

    Ok(RecoveredStreams::from_buffers(buffers))
}
