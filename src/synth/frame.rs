//! Synthetic frame representation.

use chrono::{DateTime, Utc};

/// A serialized Ethernet frame ready for the capture writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticFrame {
    /// Timestamp copied from the source trace record.
    pub timestamp: DateTime<Utc>,

    /// Captured length. Always equal to `original_length`.
    pub captured_length: u32,

    /// Length on the wire.
    pub original_length: u32,

    /// Ethernet + IP + UDP + payload bytes.
    pub data: Vec<u8>,
}

impl SyntheticFrame {
    /// Create a frame; both lengths are taken from `data`.
    pub(crate) fn new(timestamp: DateTime<Utc>, data: Vec<u8>, length: u32) -> Self {
        Self {
            timestamp,
            captured_length: length,
            original_length: length,
            data,
        }
    }

    /// Check if the frame was truncated. Synthetic frames never are.
    pub fn is_truncated(&self) -> bool {
        self.captured_length < self.original_length
    }
}
