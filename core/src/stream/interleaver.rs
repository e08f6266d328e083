//! Round-robin byte interleaver (3:1 multiplexer).
//!
//! Every round polls source 1, then 2, up to N, in that fixed order; the order
//! defines which slot a byte lands in. A source that already sent
//! `EndOfStream` contributes `Absent` without being polled. The first round in
//! which no source yields a byte ends the run and is not recorded.

use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError};
use tracing::{debug, trace};

use crate::stream::combined::CombinedSequence;
use crate::telemetry::MuxCounters;
use crate::types::{MuxError, Slot, SourceId, StreamItem};

pub struct Interleaver {
    inputs: Vec<Receiver<StreamItem>>,
    round_timeout: Option<Duration>,
}

impl Interleaver {
    /// `inputs[j]` is the channel of source `j + 1`.
    pub fn new(inputs: Vec<Receiver<StreamItem>>, round_timeout: Option<Duration>) -> Self {
        Self { inputs, round_timeout }
    }

    pub fn width(&self) -> usize {
        self.inputs.len()
    }

    /// Interleave until every source has ended.
    ///
    /// Consumes the interleaver; dropping the receivers on return unblocks any
    /// source still waiting on a full channel.
    pub fn run(self) -> Result<(CombinedSequence, MuxCounters), MuxError> {
        let width = self.width();
        let mut combined = CombinedSequence::new(width);
        let mut counters = MuxCounters::default();
        let mut exhausted = vec![false; width];
        let mut round_slots = Vec::with_capacity(width);
        let mut round: u64 = 0;

        debug!(width, timeout = ?self.round_timeout, "interleaver started");

        loop {
            round_slots.clear();
            let mut present = 0usize;

            for index in 0..width {
                if exhausted[index] {
                    round_slots.push(Slot::Absent);
                    continue;
                }
                match self.fetch(index, round)? {
                    StreamItem::Byte(b) => {
                        present += 1;
                        round_slots.push(Slot::Present(b));
                    }
                    StreamItem::EndOfStream => {
                        trace!(id = %SourceId::from_index(index), round, "source exhausted");
                        exhausted[index] = true;
                        round_slots.push(Slot::Absent);
                    }
                }
            }

            if present == 0 {
                break;
            }

            combined.push_round(&round_slots);
            counters.add_round(present, width - present);
            round += 1;
        }

        debug!(rounds = round, slots = combined.len(), "interleaver finished");
        Ok((combined, counters))
    }

    fn fetch(&self, index: usize, round: u64) -> Result<StreamItem, MuxError> {
        let id = SourceId::from_index(index);
        let rx = &self.inputs[index];
        match self.round_timeout {
            Some(timeout) => rx.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => MuxError::SourceStalled { id, round, timeout },
                RecvTimeoutError::Disconnected => MuxError::SourceAbandoned { id, round },
            }),
            None => rx.recv().map_err(|_| MuxError::SourceAbandoned { id, round }),
        }
    }
}
