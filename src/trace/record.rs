//! Parsed trace record representation.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Direction of an ISAKMP message as seen by the logging device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The device sent the message to its peer.
    Sent,
    /// The device received the message from its peer.
    Received,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sent => f.write_str("sent"),
            Direction::Received => f.write_str("received"),
        }
    }
}

/// One ISAKMP message recovered from the debug trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    /// Ordinal from the `[N]` header token. Not necessarily contiguous.
    pub sequence: u32,

    /// Whether the device sent or received the message.
    pub direction: Direction,

    /// Time printed in the header line. The device prints no zone, so UTC.
    pub timestamp: DateTime<Utc>,

    /// Address of the logging device.
    pub local_address: IpAddr,

    /// Address of the peer.
    pub remote_address: IpAddr,

    /// ISAKMP message bytes, exactly as long as the declared length.
    pub payload: Vec<u8>,
}

impl TraceRecord {
    /// Source and destination addresses for this record's direction.
    pub fn endpoints(&self) -> (IpAddr, IpAddr) {
        match self.direction {
            Direction::Sent => (self.local_address, self.remote_address),
            Direction::Received => (self.remote_address, self.local_address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(direction: Direction) -> TraceRecord {
        TraceRecord {
            sequence: 1,
            direction,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            local_address: "192.0.2.1".parse().unwrap(),
            remote_address: "198.51.100.1".parse().unwrap(),
            payload: vec![0xaa],
        }
    }

    #[test]
    fn test_endpoints_follow_direction() {
        let local: IpAddr = "192.0.2.1".parse().unwrap();
        let remote: IpAddr = "198.51.100.1".parse().unwrap();

        assert_eq!(record(Direction::Sent).endpoints(), (local, remote));
        assert_eq!(record(Direction::Received).endpoints(), (remote, local));
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Sent.to_string(), "sent");
        assert_eq!(Direction::Received.to_string(), "received");
    }
}
