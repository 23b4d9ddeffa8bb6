//! Classic libpcap file writer.
//!
//! Header and record encoding is done by `pcap-parser`'s serializer; this
//! type only enforces call order and streams the encoded blocks.

use std::io::Write;

use pcap_parser::{LegacyPcapBlock, Linktype, PcapHeader, ToVec};

use crate::error::{Error, PcapError, Result};
use crate::synth::SyntheticFrame;

/// Maximum frame length declared in the global header.
pub const DEFAULT_SNAPLEN: u32 = 65535;

/// Streams frames into a pcap container.
///
/// Call order is `write_global_header` once, then `write_frame` for each
/// frame, then `finish`. Fields are written little-endian with the
/// microsecond magic `0xa1b2c3d4`.
pub struct PcapWriter<W: Write> {
    inner: W,
    header_written: bool,
    frames_written: u64,
}

impl<W: Write> PcapWriter<W> {
    /// Wrap a writer. Nothing is written until the global header.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            header_written: false,
            frames_written: 0,
        }
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Write the 24-byte global header.
    pub fn write_global_header(&mut self, snaplen: u32, link_type: Linktype) -> Result<()> {
        if self.header_written {
            return Err(PcapError::InvalidState {
                reason: "global header already written",
            }
            .into());
        }

        let mut header = PcapHeader::new();
        header.snaplen = snaplen;
        header.network = link_type;
        let bytes = header.to_vec().map_err(|e| PcapError::Encode {
            reason: format!("{e:?}"),
        })?;

        self.inner.write_all(&bytes)?;
        self.header_written = true;
        Ok(())
    }

    /// Write one frame record: 16-byte record header plus frame bytes.
    pub fn write_frame(&mut self, frame: &SyntheticFrame) -> Result<()> {
        if !self.header_written {
            return Err(PcapError::InvalidState {
                reason: "frame written before global header",
            }
            .into());
        }

        let ts_sec = u32::try_from(frame.timestamp.timestamp()).map_err(|_| {
            Error::Pcap(PcapError::TimestampOutOfRange {
                timestamp: frame.timestamp.to_rfc3339(),
            })
        })?;

        let block = LegacyPcapBlock {
            ts_sec,
            ts_usec: frame.timestamp.timestamp_subsec_micros(),
            caplen: frame.captured_length,
            origlen: frame.original_length,
            data: &frame.data,
        };
        let bytes = block.to_vec_raw().map_err(|e| PcapError::Encode {
            reason: format!("{e:?}"),
        })?;

        self.inner.write_all(&bytes)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Flush buffered output and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        if !self.header_written {
            return Err(PcapError::InvalidState {
                reason: "capture closed without a global header",
            }
            .into());
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn frame(data: Vec<u8>) -> SyntheticFrame {
        let length = data.len() as u32;
        SyntheticFrame::new(
            Utc.timestamp_opt(1_000_000_000, 250_000_000).unwrap(),
            data,
            length,
        )
    }

    #[test]
    fn test_global_header_layout() {
        let mut writer = PcapWriter::new(Vec::new());
        writer
            .write_global_header(DEFAULT_SNAPLEN, Linktype::ETHERNET)
            .unwrap();
        let bytes = writer.finish().unwrap();

        assert_eq!(
            bytes,
            vec![
                0xd4, 0xc3, 0xb2, 0xa1, // Magic (little endian)
                0x02, 0x00, // Version major (2)
                0x04, 0x00, // Version minor (4)
                0x00, 0x00, 0x00, 0x00, // Thiszone
                0x00, 0x00, 0x00, 0x00, // Sigfigs
                0xff, 0xff, 0x00, 0x00, // Snaplen (65535)
                0x01, 0x00, 0x00, 0x00, // Network (Ethernet)
            ]
        );
    }

    #[test]
    fn test_frame_record_layout() {
        let mut writer = PcapWriter::new(Vec::new());
        writer
            .write_global_header(DEFAULT_SNAPLEN, Linktype::ETHERNET)
            .unwrap();
        writer.write_frame(&frame(vec![0xde, 0xad])).unwrap();
        assert_eq!(writer.frames_written(), 1);

        let bytes = writer.finish().unwrap();
        let record = &bytes[24..];
        assert_eq!(&record[0..4], &1_000_000_000u32.to_le_bytes());
        assert_eq!(&record[4..8], &250_000u32.to_le_bytes());
        assert_eq!(&record[8..12], &2u32.to_le_bytes());
        assert_eq!(&record[12..16], &2u32.to_le_bytes());
        assert_eq!(&record[16..], &[0xde, 0xad]);
    }

    #[test]
    fn test_frame_before_header_rejected() {
        let mut writer = PcapWriter::new(Vec::new());
        let err = writer.write_frame(&frame(vec![0x00])).unwrap_err();
        assert!(matches!(err, Error::Pcap(PcapError::InvalidState { .. })));
    }

    #[test]
    fn test_header_written_twice_rejected() {
        let mut writer = PcapWriter::new(Vec::new());
        writer
            .write_global_header(DEFAULT_SNAPLEN, Linktype::ETHERNET)
            .unwrap();
        assert!(writer
            .write_global_header(DEFAULT_SNAPLEN, Linktype::ETHERNET)
            .is_err());
    }

    #[test]
    fn test_pre_epoch_timestamp_rejected() {
        let mut writer = PcapWriter::new(Vec::new());
        writer
            .write_global_header(DEFAULT_SNAPLEN, Linktype::ETHERNET)
            .unwrap();

        let mut old = frame(vec![0x00]);
        old.timestamp = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 59).unwrap();
        let err = writer.write_frame(&old).unwrap_err();
        assert!(matches!(
            err,
            Error::Pcap(PcapError::TimestampOutOfRange { .. })
        ));
    }

    #[test]
    fn test_timestamp_past_u32_seconds_rejected() {
        let mut writer = PcapWriter::new(Vec::new());
        writer
            .write_global_header(DEFAULT_SNAPLEN, Linktype::ETHERNET)
            .unwrap();

        // 2^32 seconds after the epoch falls in February 2106
        let mut late = frame(vec![0x00]);
        late.timestamp = Utc.with_ymd_and_hms(2200, 1, 1, 10, 0, 0).unwrap();
        let err = writer.write_frame(&late).unwrap_err();
        assert!(matches!(
            err,
            Error::Pcap(PcapError::TimestampOutOfRange { .. })
        ));
        assert_eq!(writer.frames_written(), 0);

        // The last representable second is still accepted
        let mut last = frame(vec![0x00]);
        last.timestamp = Utc.timestamp_opt(u32::MAX as i64, 0).unwrap();
        writer.write_frame(&last).unwrap();
        assert_eq!(writer.frames_written(), 1);
    }
}
