//! telemetry/snapshot.rs
//! Immutable, serializable view of a finished run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::telemetry::counters::MuxCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub started_at: DateTime<Utc>,
    pub source_count: usize,
    pub frames_read: u64,
    pub bytes_read: u64,
    pub rounds: u64,
    pub slots_present: u64,
    pub slots_absent: u64,
    pub bytes_recovered: u64,
    /// Fraction of combined slots that are padding.
    pub padding_ratio: f64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(
        counters: &MuxCounters,
        timer: &TelemetryTimer,
        started_at: DateTime<Utc>,
        source_count: usize,
    ) -> Self {
        let elapsed = timer.elapsed();

        let total_slots = counters.total_slots();
        let padding_ratio = if total_slots > 0 {
            counters.slots_absent as f64 / total_slots as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_read as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            started_at,
            source_count,
            frames_read: counters.frames_read,
            bytes_read: counters.bytes_read,
            rounds: counters.rounds,
            slots_present: counters.slots_present,
            slots_absent: counters.slots_absent,
            bytes_recovered: counters.bytes_recovered,
            padding_ratio,
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_slots(&self) -> u64 {
        self.slots_present + self.slots_absent
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Internal invariants:
    /// - slots form whole rounds of `source_count`
    /// - every present slot is a byte that was read
    /// - nothing is recovered that was never read
    pub fn sanity_check(&self) -> bool {
        self.source_count > 0
            && self.total_slots() == self.rounds * self.source_count as u64
            && self.slots_present <= self.bytes_read
            && self.bytes_recovered <= self.bytes_read
            && self.padding_ratio <= 1.0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
