//! Error types for isakmp2pcap.
//!
//! Each pipeline stage has its own error enum; [`enum@Error`] wraps them so
//! callers can tell which stage failed.

use std::net::IpAddr;

use thiserror::Error;

/// Main error type for isakmp2pcap operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error while parsing the debug trace
    #[error("Trace parse error: {0}")]
    Trace(#[from] TraceError),

    /// Error while building a synthetic frame
    #[error("Frame synthesis error: {0}")]
    Synth(#[from] SynthError),

    /// Error while writing the capture file
    #[error("PCAP write error: {0}")]
    Pcap(#[from] PcapError),

    /// Input trace could not be opened
    #[error("Cannot open trace file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the trace parser once a record is in progress.
///
/// A header line that does not match is never an error; the parser simply
/// keeps looking for the next header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// A record field does not match its expected layout
    #[error("line {line}: invalid {field}: {reason}")]
    FieldFormat {
        line: usize,
        field: &'static str,
        reason: String,
    },

    /// The payload lines carry more bytes than the declared length
    #[error("line {line}: payload is longer than declared length (declared {declared}, got {actual})")]
    PayloadOverrun {
        line: usize,
        declared: usize,
        actual: usize,
    },

    /// Input ended in the middle of a record
    #[error("input ended while {state}")]
    Truncated { state: &'static str },
}

/// Errors raised while synthesizing a frame from a trace record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// Local and remote addresses are not of the same IP family
    #[error("address family mismatch: local {local}, remote {remote}")]
    AddressFamily { local: IpAddr, remote: IpAddr },

    /// The frame could not be serialized
    #[error("cannot serialize frame: {reason}")]
    Serialization { reason: String },
}

/// Errors raised by the capture writer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PcapError {
    /// Writer calls made out of order
    #[error("invalid writer state: {reason}")]
    InvalidState { reason: &'static str },

    /// Timestamp cannot be stored in a classic pcap record header
    #[error("timestamp {timestamp} is outside the pcap range")]
    TimestampOutOfRange { timestamp: String },

    /// The pcap serializer rejected a header or record
    #[error("cannot encode pcap block: {reason}")]
    Encode { reason: String },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
