//! Round-trip verification: recovered stream vs. what its source emitted.

use serde::{Deserialize, Serialize};

use crate::stream::reconstruct::RecoveredStreams;
use crate::stream::source::SourceStats;
use crate::types::SourceId;
use crate::utils::compute_checksum;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCheck {
    pub id: SourceId,
    pub expected_len: u64,
    pub actual_len: u64,
    pub expected_crc: u32,
    pub actual_crc: u32,
}

impl StreamCheck {
    pub fn matches(&self) -> bool {
        self.expected_len == self.actual_len && self.expected_crc == self.actual_crc
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerifyReport {
    pub checks: Vec<StreamCheck>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.checks.iter().all(StreamCheck::matches)
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &StreamCheck> {
        self.checks.iter().filter(|c| !c.matches())
    }
}

/// Compare two in-memory sequences.
pub fn compare(id: SourceId, original: &[u8], recovered: &[u8]) -> StreamCheck {
    StreamCheck {
        id,
        expected_len: original.len() as u64,
        actual_len: recovered.len() as u64,
        expected_crc: compute_checksum(original),
        actual_crc: compute_checksum(recovered),
    }
}

/// Check every recovered stream against its source's length and CRC.
///
/// A source with no recovered counterpart is reported as recovered empty.
pub fn verify(stats: &[SourceStats], recovered: &RecoveredStreams) -> VerifyReport {
    let checks = stats
        .iter()
        .map(|s| {
            let bytes: &[u8] = recovered.get(s.id).map_or(&[][..], |r| &r.bytes[..]);
            StreamCheck {
                id: s.id,
                expected_len: s.bytes_sent(),
                actual_len: bytes.len() as u64,
                expected_crc: s.checksum,
                actual_crc: compute_checksum(bytes),
            }
        })
        .collect();
    VerifyReport { checks }
}
