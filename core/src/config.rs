//! Run configuration for the multiplexer.
//!
//! Frame size, source count and channel capacity are passed to the
//! orchestrator at construction instead of living in module state.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_FRAME_SIZE, DEFAULT_ROUND_TIMEOUT, DEFAULT_SOURCE_COUNT,
    MAX_FRAME_SIZE,
};
use crate::types::MuxError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuxConfig {
    /// Bytes read from a backing input per step.
    pub frame_size: usize,
    /// Number of tributary streams (3 for STS-3).
    pub source_count: usize,
    /// Capacity of each source channel, in items.
    pub channel_capacity: usize,
    /// Per-fetch deadline in milliseconds; `None` blocks indefinitely.
    pub round_timeout_ms: Option<u64>,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            source_count: DEFAULT_SOURCE_COUNT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            round_timeout_ms: Some(DEFAULT_ROUND_TIMEOUT.as_millis() as u64),
        }
    }
}

impl MuxConfig {
    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    pub fn with_source_count(mut self, source_count: usize) -> Self {
        self.source_count = source_count;
        self
    }

    pub fn with_channel_capacity(mut self, channel_capacity: usize) -> Self {
        self.channel_capacity = channel_capacity;
        self
    }

    /// Sub-millisecond deadlines round up to the next whole millisecond.
    pub fn with_round_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.round_timeout_ms =
            timeout.map(|t| u64::try_from(t.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX));
        self
    }

    pub fn round_timeout(&self) -> Option<Duration> {
        self.round_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), MuxError> {
        if self.frame_size == 0 || self.frame_size > MAX_FRAME_SIZE {
            return Err(MuxError::Config(format!(
                "frame_size must be in 1..={MAX_FRAME_SIZE}, got {}",
                self.frame_size
            )));
        }
        if self.source_count == 0 {
            return Err(MuxError::Config("source_count must be at least 1".into()));
        }
        if self.channel_capacity == 0 {
            return Err(MuxError::Config("channel_capacity must be at least 1".into()));
        }
        if self.round_timeout_ms == Some(0) {
            return Err(MuxError::Config("round_timeout_ms must be non-zero".into()));
        }
        Ok(())
    }

    /// Parse a JSON config; missing fields fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self, MuxError> {
        let config: MuxConfig =
            serde_json::from_str(json).map_err(|e| MuxError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, MuxError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| MuxError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }
}
