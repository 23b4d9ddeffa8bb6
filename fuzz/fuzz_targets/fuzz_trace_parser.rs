//! Fuzz target for the debug trace parser.
//!
//! Tests handling of malformed traces including:
//! - Header lines with odd token counts and timestamps
//! - Truncated and oversized payloads
//! - Invalid hex tokens and non-UTF-8 bytes

#![no_main]

use libfuzzer_sys::fuzz_target;
use isakmp2pcap::TraceReader;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let reader = TraceReader::new(Cursor::new(data));

    // Read all records - should never panic
    for record in reader {
        if record.is_err() {
            break;
        }
    }
});
