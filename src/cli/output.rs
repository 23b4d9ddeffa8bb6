//! Output formatting for preview mode.
//!
//! Prints each parsed trace record either as a human-readable block or as
//! one JSON object per line.

use std::io::Write;

use clap::ValueEnum;
use serde_json::json;

use crate::trace::TraceRecord;

/// Bytes per line in the text hex dump.
const HEX_DUMP_WIDTH: usize = 16;

/// Supported preview formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable blocks (default)
    Text,
    /// JSON Lines (one JSON object per record)
    Json,
}

/// Formats trace records for preview output.
pub struct RecordFormatter {
    format: OutputFormat,
}

impl RecordFormatter {
    /// Create a new formatter with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format a record and write it to the given writer.
    pub fn write<W: Write>(&self, record: &TraceRecord, writer: &mut W) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => self.write_text(record, writer),
            OutputFormat::Json => self.write_json(record, writer),
        }
    }

    fn write_text<W: Write>(&self, record: &TraceRecord, writer: &mut W) -> std::io::Result<()> {
        writeln!(
            writer,
            "[{}] {} {}",
            record.sequence,
            record.direction,
            record.timestamp.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(writer, "  local:  {}", record.local_address)?;
        writeln!(writer, "  remote: {}", record.remote_address)?;
        writeln!(writer, "  length: {}", record.payload.len())?;

        for chunk in record.payload.chunks(HEX_DUMP_WIDTH) {
            writeln!(writer, "    {}", hex::encode(chunk))?;
        }
        writeln!(writer)
    }

    fn write_json<W: Write>(&self, record: &TraceRecord, writer: &mut W) -> std::io::Result<()> {
        let value = json!({
            "sequence": record.sequence,
            "direction": record.direction,
            "timestamp": record.timestamp.to_rfc3339(),
            "local_address": record.local_address.to_string(),
            "remote_address": record.remote_address.to_string(),
            "length": record.payload.len(),
            "payload": hex::encode(&record.payload),
        });
        serde_json::to_writer(&mut *writer, &value)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Direction;
    use chrono::{TimeZone, Utc};

    fn record() -> TraceRecord {
        TraceRecord {
            sequence: 7,
            direction: Direction::Received,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            local_address: "192.0.2.1".parse().unwrap(),
            remote_address: "198.51.100.1".parse().unwrap(),
            payload: (0u8..20).collect(),
        }
    }

    #[test]
    fn test_text_output() {
        let formatter = RecordFormatter::new(OutputFormat::Text);
        let mut out = Vec::new();
        formatter.write(&record(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[7] received 2024-01-01 10:00:00\n"));
        assert!(text.contains("  local:  192.0.2.1\n"));
        assert!(text.contains("  remote: 198.51.100.1\n"));
        assert!(text.contains("  length: 20\n"));
        assert!(text.contains("    000102030405060708090a0b0c0d0e0f\n"));
        assert!(text.contains("    10111213\n"));
    }

    #[test]
    fn test_json_output() {
        let formatter = RecordFormatter::new(OutputFormat::Json);
        let mut out = Vec::new();
        formatter.write(&record(), &mut out).unwrap();

        let line = String::from_utf8(out).unwrap();
        assert!(line.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["sequence"], 7);
        assert_eq!(value["direction"], "received");
        assert_eq!(value["timestamp"], "2024-01-01T10:00:00+00:00");
        assert_eq!(value["local_address"], "192.0.2.1");
        assert_eq!(value["length"], 20);
        assert_eq!(value["payload"], "000102030405060708090a0b0c0d0e0f10111213");
    }
}
