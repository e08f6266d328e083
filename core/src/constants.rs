//! Defaults for a multiplexer run.
//!
//! These are only defaults: every value is carried by `MuxConfig` so tests can
//! shrink frames or change the source count.

use std::time::Duration;

/// One STS-1 frame: 9 rows x 90 columns.
pub const DEFAULT_FRAME_SIZE: usize = 810;

/// 3:1 multiplexer, STS-1 x 3 -> STS-3.
pub const DEFAULT_SOURCE_COUNT: usize = 3;

/// Source channels buffer one frame.
pub const DEFAULT_CHANNEL_CAPACITY: usize = DEFAULT_FRAME_SIZE;

/// Per-fetch deadline applied by the interleaver.
pub const DEFAULT_ROUND_TIMEOUT: Duration = Duration::from_secs(30);

/// Byte written on the wire for an exhausted source.
pub const PLACEHOLDER_BYTE: u8 = 0x00;

/// Sanity bound for a configured frame (1 MiB).
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;
