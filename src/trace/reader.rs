//! Iterator adapter over a buffered trace source.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{TraceParser, TraceRecord};
use crate::error::{Error, Result};

/// Reads trace records from any buffered source, one line at a time.
///
/// Lines are decoded lossily: device logs occasionally contain stray
/// non-UTF-8 bytes in banner lines, which must not abort the read.
pub struct TraceReader<R> {
    inner: R,
    parser: TraceParser,
    buf: Vec<u8>,
    done: bool,
}

impl TraceReader<BufReader<File>> {
    /// Open a trace file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceReader<R> {
    /// Wrap a buffered reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            parser: TraceParser::new(),
            buf: Vec::with_capacity(256),
            done: false,
        }
    }

    /// The underlying parser, for position and progress queries.
    pub fn parser(&self) -> &TraceParser {
        &self.parser
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at a clean end of input.
    pub fn next_record(&mut self) -> Result<Option<TraceRecord>> {
        if self.done {
            return Ok(None);
        }

        loop {
            self.buf.clear();
            let read = self.inner.read_until(b'\n', &mut self.buf)?;
            if read == 0 {
                self.done = true;
                self.parser.finish()?;
                return Ok(None);
            }

            let line = String::from_utf8_lossy(&self.buf);
            if let Some(record) = self.parser.feed_line(&line)? {
                return Ok(Some(record));
            }
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TraceError;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const TRACE: &str = "\
IKE debug output follows
[1] ISAKMP Send Packet: Jan 1 10:00:00 2024
Local  Address:(192.0.2.1)
Remote Address:(198.51.100.1)
Cookies:(0123456789abcdef:0000000000000000)
Exchange Type: ID (4)
data=aa bb cc dd

[2] ISAKMP Receive Packet: Jan 1 10:00:01 2024
Local  Address:(192.0.2.1)
Remote Address:(198.51.100.1)
Cookies:(0123456789abcdef:fedcba9876543210)
Exchange Type: ID (2)
data=eeff
";

    #[test]
    fn test_iterate_records() {
        let reader = TraceReader::new(Cursor::new(TRACE));
        let records: Vec<_> = reader.collect::<Result<_>>().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].payload, vec![0xaa, 0xbb, 0xcc, 0xdd]);
        assert_eq!(records[1].payload, vec![0xee, 0xff]);
    }

    #[test]
    fn test_crlf_and_invalid_utf8() {
        let mut input = b"\xff\xfe banner\r\n".to_vec();
        input.extend_from_slice(TRACE.replace('\n', "\r\n").as_bytes());

        let reader = TraceReader::new(Cursor::new(input));
        let records: Vec<_> = reader.collect::<Result<_>>().unwrap();

        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_truncated_input_errors_once() {
        let truncated = &TRACE[..TRACE.find("data=eeff").unwrap()];
        let mut reader = TraceReader::new(Cursor::new(truncated));

        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(Error::Trace(TraceError::Truncated { .. }))) => {}
            other => panic!("expected truncation error, got {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_open_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(TRACE.as_bytes()).unwrap();
        temp.flush().unwrap();

        let reader = TraceReader::open(temp.path()).unwrap();
        assert_eq!(reader.count(), 2);
    }

    #[test]
    fn test_open_missing_file() {
        let result = TraceReader::open("/nonexistent/trace.log");
        assert!(matches!(result, Err(Error::Open { .. })));
    }
}
