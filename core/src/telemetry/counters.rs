//! telemetry/counters.rs
//! Mutable counters collected while streams are read, interleaved and rebuilt.
//! Converted into an immutable `TelemetrySnapshot` at the end of a run.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuxCounters {
    pub frames_read: u64,
    pub bytes_read: u64,
    pub rounds: u64,
    pub slots_present: u64,
    pub slots_absent: u64,
    pub bytes_recovered: u64,
}

impl MuxCounters {
    /// Record one frame pulled from a backing input.
    pub fn add_frame(&mut self, frame_len: usize) {
        self.frames_read += 1;
        self.bytes_read += frame_len as u64;
    }

    /// Record one completed round.
    pub fn add_round(&mut self, present: usize, absent: usize) {
        self.rounds += 1;
        self.slots_present += present as u64;
        self.slots_absent += absent as u64;
    }

    pub fn add_recovered(&mut self, len: usize) {
        self.bytes_recovered += len as u64;
    }

    pub fn total_slots(&self) -> u64 {
        self.slots_present + self.slots_absent
    }

    // Worker-local counters are merged once, at join time.
    pub fn merge(&mut self, other: &MuxCounters) {
        self.frames_read += other.frames_read;
        self.bytes_read += other.bytes_read;
        self.rounds += other.rounds;
        self.slots_present += other.slots_present;
        self.slots_absent += other.slots_absent;
        self.bytes_recovered += other.bytes_recovered;
    }
}

impl AddAssign for MuxCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
