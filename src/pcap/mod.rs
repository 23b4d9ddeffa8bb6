//! PCAP capture writing.
//!
//! This module writes classic libpcap files, the container every packet
//! analysis tool can open.

mod writer;

pub use pcap_parser::Linktype;
pub use writer::{PcapWriter, DEFAULT_SNAPLEN};
