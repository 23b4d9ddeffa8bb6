//! Value formatting utilities for link-layer addresses.
//!
//! Provides conversion between MAC address bytes and their colon-separated
//! hex notation. The CLI parses `--local-mac`/`--remote-mac` with
//! [`parse_mac`] and logs the addresses in effect with [`format_mac`].

mod address;

pub use address::{format_mac, parse_mac, MacParseError};
