//! Fuzz target for the full trace-to-capture conversion.
//!
//! Every record the parser accepts must either synthesize into a frame or
//! fail with an error, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use isakmp2pcap::pipeline::convert;
use isakmp2pcap::SynthConfig;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let _ = convert(Cursor::new(data), Vec::new(), SynthConfig::default());
});
