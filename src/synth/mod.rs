//! Synthetic frame construction.
//!
//! Wraps each trace record's ISAKMP payload in Ethernet, IPv4 or IPv6, and
//! UDP headers so the exchange can be opened in ordinary packet tools. The
//! link-layer addresses are fabricated; everything else comes from the
//! record.

mod frame;

use std::net::IpAddr;

use etherparse::PacketBuilder;
use tracing::debug;

pub use frame::SyntheticFrame;

use crate::error::SynthError;
use crate::trace::{Direction, TraceRecord};

/// Well-known ISAKMP UDP port.
pub const ISAKMP_PORT: u16 = 500;

/// Default MAC for the logging device (RFC 7042 documentation range).
pub const DEFAULT_LOCAL_MAC: [u8; 6] = [0x00, 0x00, 0x5e, 0x00, 0x53, 0x01];

/// Default MAC for the peer (RFC 7042 documentation range).
pub const DEFAULT_REMOTE_MAC: [u8; 6] = [0x00, 0x00, 0x5e, 0x00, 0x53, 0x02];

/// Default IPv4 TTL and IPv6 hop limit.
pub const DEFAULT_HOP_LIMIT: u8 = 0xff;

/// Fixed values used when fabricating frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthConfig {
    /// MAC address of the logging device.
    pub local_mac: [u8; 6],
    /// MAC address of the peer.
    pub remote_mac: [u8; 6],
    /// IPv4 TTL / IPv6 hop limit.
    pub hop_limit: u8,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            local_mac: DEFAULT_LOCAL_MAC,
            remote_mac: DEFAULT_REMOTE_MAC,
            hop_limit: DEFAULT_HOP_LIMIT,
        }
    }
}

impl SynthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local_mac(mut self, mac: [u8; 6]) -> Self {
        self.local_mac = mac;
        self
    }

    pub fn remote_mac(mut self, mac: [u8; 6]) -> Self {
        self.remote_mac = mac;
        self
    }

    pub fn hop_limit(mut self, hop_limit: u8) -> Self {
        self.hop_limit = hop_limit;
        self
    }
}

/// Builds one [`SyntheticFrame`] per trace record.
#[derive(Debug, Clone, Default)]
pub struct PacketSynthesizer {
    config: SynthConfig,
}

impl PacketSynthesizer {
    /// Create a synthesizer with the given addresses.
    pub fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    /// Build the frame for one record.
    ///
    /// The address family follows the local address. `Sent` records go from
    /// the local endpoint to the remote one, `Received` records the other way.
    /// The IPv4 header checksum and the UDP checksum are always computed.
    pub fn synthesize(&self, record: &TraceRecord) -> Result<SyntheticFrame, SynthError> {
        let (src_mac, dst_mac) = match record.direction {
            Direction::Sent => (self.config.local_mac, self.config.remote_mac),
            Direction::Received => (self.config.remote_mac, self.config.local_mac),
        };
        // IPv4-mapped IPv6 literals describe IPv4 endpoints
        let (src_ip, dst_ip) = record.endpoints();
        let (src_ip, dst_ip) = (src_ip.to_canonical(), dst_ip.to_canonical());

        let ethernet = PacketBuilder::ethernet2(src_mac, dst_mac);
        let ip = match (src_ip, dst_ip) {
            (IpAddr::V4(src), IpAddr::V4(dst)) => {
                ethernet.ipv4(src.octets(), dst.octets(), self.config.hop_limit)
            }
            (IpAddr::V6(src), IpAddr::V6(dst)) => {
                ethernet.ipv6(src.octets(), dst.octets(), self.config.hop_limit)
            }
            _ => {
                return Err(SynthError::AddressFamily {
                    local: record.local_address.to_canonical(),
                    remote: record.remote_address.to_canonical(),
                })
            }
        };
        let builder = ip.udp(ISAKMP_PORT, ISAKMP_PORT);

        let mut data = Vec::with_capacity(builder.size(record.payload.len()));
        builder
            .write(&mut data, &record.payload)
            .map_err(|e| SynthError::Serialization {
                reason: e.to_string(),
            })?;

        let length = u32::try_from(data.len()).map_err(|_| SynthError::Serialization {
            reason: format!("frame of {} bytes is too large", data.len()),
        })?;

        debug!(
            sequence = record.sequence,
            src = %src_ip,
            dst = %dst_ip,
            length,
            "synthesized frame"
        );

        Ok(SyntheticFrame::new(record.timestamp, data, length))
    }
}
