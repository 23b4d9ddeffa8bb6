//! Line-driven state machine for ISAKMP debug traces.
//!
//! A record spans six fields over a variable number of lines:
//!
//! ```text
//! [3] ISAKMP Send Packet: Jan 1 10:00:00 2024
//! Local  Address:(192.0.2.1)
//! Remote Address:(198.51.100.1)
//! Cookies:(0123456789abcdef:fedcba9876543210)
//! Exchange Type: ID (8)
//! data=aabb ccdd
//! eeff 0011
//! ```
//!
//! Lines that do not look like a header are skipped while waiting for a new
//! record, since device logs are full of banners and unrelated output. Once a
//! header has been accepted every following field must match, otherwise the
//! whole trace is rejected: there is no way to resynchronize mid-record.

use std::fmt;
use std::mem;
use std::net::IpAddr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::{debug, trace};

use super::{Direction, TraceRecord};
use crate::error::TraceError;

const HEADER_MARKER: &str = "ISAKMP";
const LOCAL_PREFIX: &str = "Local  Address:(";
const REMOTE_PREFIX: &str = "Remote Address:(";
const COOKIES_PREFIX: &str = "Cookies:(";
const COOKIES_LINE_LEN: usize = 43;
const EXCHANGE_PREFIX: &str = "Exchange Type: ";
const DATA_PREFIX: &str = "data=";

/// Timestamp layout after the header tokens are put in day-month-year order.
const TIMESTAMP_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// Largest payload a UDP datagram can carry.
const MAX_PAYLOAD_LEN: usize = u16::MAX as usize - 8;

/// Externally visible parser position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    AwaitingHeader,
    AwaitingLocalAddress,
    AwaitingRemoteAddress,
    AwaitingCookiePair,
    AwaitingPayloadLength,
    AccumulatingPayload,
}

impl ParseState {
    fn description(self) -> &'static str {
        match self {
            ParseState::AwaitingHeader => "waiting for a record header",
            ParseState::AwaitingLocalAddress => "waiting for the local address",
            ParseState::AwaitingRemoteAddress => "waiting for the remote address",
            ParseState::AwaitingCookiePair => "waiting for the cookie pair",
            ParseState::AwaitingPayloadLength => "waiting for the exchange type line",
            ParseState::AccumulatingPayload => "reading payload bytes",
        }
    }
}

impl fmt::Display for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone)]
struct Header {
    sequence: u32,
    direction: Direction,
    timestamp: DateTime<Utc>,
}

#[derive(Debug)]
struct PartialRecord {
    header: Header,
    local: IpAddr,
    remote: IpAddr,
    declared: usize,
    seen_data_line: bool,
    payload: Vec<u8>,
}

impl PartialRecord {
    fn finish(self) -> TraceRecord {
        TraceRecord {
            sequence: self.header.sequence,
            direction: self.header.direction,
            timestamp: self.header.timestamp,
            local_address: self.local,
            remote_address: self.remote,
            payload: self.payload,
        }
    }
}

/// Parser state. Each variant owns the fields collected so far.
#[derive(Debug, Default)]
enum State {
    #[default]
    AwaitingHeader,
    AwaitingLocalAddress(Header),
    AwaitingRemoteAddress(Header, IpAddr),
    AwaitingCookiePair(Header, IpAddr, IpAddr),
    AwaitingPayloadLength(Header, IpAddr, IpAddr),
    AccumulatingPayload(PartialRecord),
}

impl State {
    fn kind(&self) -> ParseState {
        match self {
            State::AwaitingHeader => ParseState::AwaitingHeader,
            State::AwaitingLocalAddress(..) => ParseState::AwaitingLocalAddress,
            State::AwaitingRemoteAddress(..) => ParseState::AwaitingRemoteAddress,
            State::AwaitingCookiePair(..) => ParseState::AwaitingCookiePair,
            State::AwaitingPayloadLength(..) => ParseState::AwaitingPayloadLength,
            State::AccumulatingPayload(..) => ParseState::AccumulatingPayload,
        }
    }
}

/// Push-style trace parser.
///
/// Feed it lines with [`feed_line`](Self::feed_line); each completed record
/// is returned as soon as its payload reaches the declared length. Call
/// [`finish`](Self::finish) at end of input to detect a dangling record.
///
/// After a fatal error the parser is back in the header state and should be
/// discarded; the trace it was reading is corrupt.
#[derive(Debug, Default)]
pub struct TraceParser {
    state: State,
    line_number: usize,
    records: usize,
}

impl TraceParser {
    /// Create a parser waiting for the first header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current parser position.
    pub fn state(&self) -> ParseState {
        self.state.kind()
    }

    /// Number of lines fed so far (1-based number of the last line).
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Number of records completed so far.
    pub fn records_completed(&self) -> usize {
        self.records
    }

    /// Consume one input line.
    pub fn feed_line(&mut self, line: &str) -> Result<Option<TraceRecord>, TraceError> {
        self.line_number += 1;

        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let state = mem::take(&mut self.state);
        let (next, record) = self.advance(state, line)?;
        self.state = next;

        if record.is_some() {
            self.records += 1;
        }
        Ok(record)
    }

    /// Check that input did not stop in the middle of a record.
    pub fn finish(&self) -> Result<(), TraceError> {
        match self.state.kind() {
            ParseState::AwaitingHeader => Ok(()),
            kind => Err(TraceError::Truncated {
                state: kind.description(),
            }),
        }
    }

    fn advance(
        &self,
        state: State,
        line: &str,
    ) -> Result<(State, Option<TraceRecord>), TraceError> {
        match state {
            State::AwaitingHeader => match parse_header(line) {
                Some(header) => {
                    debug!(
                        line = self.line_number,
                        sequence = header.sequence,
                        direction = %header.direction,
                        timestamp = %header.timestamp,
                        "record header"
                    );
                    Ok((State::AwaitingLocalAddress(header), None))
                }
                None => {
                    trace!(line = self.line_number, "skipping non-header line");
                    Ok((State::AwaitingHeader, None))
                }
            },
            State::AwaitingLocalAddress(header) => {
                let local = parse_address(line, LOCAL_PREFIX)
                    .map_err(|reason| self.field_error("local address", reason))?;
                Ok((State::AwaitingRemoteAddress(header, local), None))
            }
            State::AwaitingRemoteAddress(header, local) => {
                let remote = parse_address(line, REMOTE_PREFIX)
                    .map_err(|reason| self.field_error("remote address", reason))?;
                Ok((State::AwaitingCookiePair(header, local, remote), None))
            }
            State::AwaitingCookiePair(header, local, remote) => {
                check_cookies(line).map_err(|reason| self.field_error("cookie pair", reason))?;
                Ok((State::AwaitingPayloadLength(header, local, remote), None))
            }
            State::AwaitingPayloadLength(header, local, remote) => {
                let declared = parse_declared_length(line)
                    .map_err(|reason| self.field_error("exchange type", reason))?;
                let partial = PartialRecord {
                    header,
                    local,
                    remote,
                    declared,
                    seen_data_line: false,
                    payload: Vec::with_capacity(declared),
                };
                Ok((State::AccumulatingPayload(partial), None))
            }
            State::AccumulatingPayload(mut partial) => {
                let tokens = if partial.seen_data_line {
                    line
                } else {
                    line.strip_prefix(DATA_PREFIX).ok_or_else(|| {
                        self.field_error(
                            "payload",
                            format!("first payload line must start with `{DATA_PREFIX}`"),
                        )
                    })?
                };
                partial.seen_data_line = true;

                let bytes =
                    decode_hex_line(tokens).map_err(|reason| self.field_error("payload", reason))?;
                partial.payload.extend_from_slice(&bytes);

                let actual = partial.payload.len();
                if actual > partial.declared {
                    return Err(TraceError::PayloadOverrun {
                        line: self.line_number,
                        declared: partial.declared,
                        actual,
                    });
                }

                if actual == partial.declared {
                    let record = partial.finish();
                    debug!(
                        sequence = record.sequence,
                        length = record.payload.len(),
                        "record complete"
                    );
                    Ok((State::AwaitingHeader, Some(record)))
                } else {
                    Ok((State::AccumulatingPayload(partial), None))
                }
            }
        }
    }

    fn field_error(&self, field: &'static str, reason: String) -> TraceError {
        TraceError::FieldFormat {
            line: self.line_number,
            field,
            reason,
        }
    }
}

/// Parse a record header such as `[3] ISAKMP Send Packet: Jan 1 10:00:00 2024`.
///
/// Returns `None` for anything that is not a header.
fn parse_header(line: &str) -> Option<Header> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let count = tokens.len();
    if count != 7 && count != 8 {
        return None;
    }
    if tokens[1] != HEADER_MARKER {
        return None;
    }

    let sequence = parse_ordinal(tokens[0])?;

    let direction = if tokens[2].starts_with("Send") {
        Direction::Sent
    } else if tokens[2].starts_with("Receive") {
        Direction::Received
    } else {
        return None;
    };

    let timestamp = parse_timestamp(&tokens[count - 4..])?;

    Some(Header {
        sequence,
        direction,
        timestamp,
    })
}

/// Parse a bracketed one or two digit ordinal (`[7]`, `[12]`).
fn parse_ordinal(token: &str) -> Option<u32> {
    let digits = token.strip_prefix('[')?.strip_suffix(']')?;
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Parse the four trailing header tokens.
///
/// Devices print `month day time year`; the tokens are also accepted when
/// already in `day month year time` order.
fn parse_timestamp(parts: &[&str]) -> Option<DateTime<Utc>> {
    let &[month, day, time, year] = parts else {
        return None;
    };

    let naive = parse_day_month_year(day, month, year, time)
        .or_else(|| parse_day_month_year(month, day, time, year))?;

    Some(Utc.from_utc_datetime(&naive))
}

fn parse_day_month_year(day: &str, month: &str, year: &str, time: &str) -> Option<NaiveDateTime> {
    // `%b` also matches full month names; devices only print the abbreviation
    if month.len() != 3 {
        return None;
    }
    let text = format!("{day} {month} {year} {time}");
    NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT).ok()
}

fn parse_address(line: &str, prefix: &str) -> Result<IpAddr, String> {
    let inner = line
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| format!("expected `{prefix}<address>)`, got `{line}`"))?;

    inner
        .parse::<IpAddr>()
        .map_err(|e| format!("`{inner}` is not an IP address: {e}"))
}

fn check_cookies(line: &str) -> Result<(), String> {
    if !line.starts_with(COOKIES_PREFIX) {
        return Err(format!("expected `{COOKIES_PREFIX}...`, got `{line}`"));
    }
    if line.len() != COOKIES_LINE_LEN {
        return Err(format!(
            "cookie line is {} characters, expected {COOKIES_LINE_LEN}",
            line.len()
        ));
    }
    Ok(())
}

/// Extract the declared payload length from the exchange type line.
///
/// Accepts a trailing parenthesized count (`Exchange Type: ID (4)`) and the
/// device's `Len:284(...)` form, where the count sits between the last `:` and
/// the last `(`. Zero and anything above [`MAX_PAYLOAD_LEN`] are rejected.
fn parse_declared_length(line: &str) -> Result<usize, String> {
    if !line.starts_with(EXCHANGE_PREFIX) {
        return Err(format!("expected `{EXCHANGE_PREFIX}...`, got `{line}`"));
    }

    let length = trailing_parenthesized(line)
        .or_else(|| colon_delimited(line))
        .ok_or_else(|| format!("no payload length in `{line}`"))?;

    if length == 0 {
        return Err("declared payload length is zero".to_string());
    }
    if length > MAX_PAYLOAD_LEN {
        return Err(format!(
            "declared payload length {length} exceeds {MAX_PAYLOAD_LEN} bytes"
        ));
    }
    Ok(length)
}

fn trailing_parenthesized(line: &str) -> Option<usize> {
    let (_, digits) = line.strip_suffix(')')?.rsplit_once('(')?;
    parse_decimal(digits)
}

fn colon_delimited(line: &str) -> Option<usize> {
    let colon = line.rfind(':')?;
    let paren = line.rfind('(')?;
    if colon > paren {
        return None;
    }
    parse_decimal(&line[colon + 1..paren])
}

fn parse_decimal(s: &str) -> Option<usize> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Digits too long for usize still name a length, just an impossible one
    Some(s.parse().unwrap_or(usize::MAX))
}

/// Decode one payload token: 2 hex digits give one byte, 4 give a
/// big-endian byte pair.
pub fn decode_hex_token(token: &str) -> Result<Vec<u8>, String> {
    match token.len() {
        2 | 4 => hex::decode(token).map_err(|e| format!("bad hex token `{token}`: {e}")),
        n => Err(format!(
            "hex token `{token}` has {n} characters, expected 2 or 4"
        )),
    }
}

fn decode_hex_line(line: &str) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    for token in line.split_whitespace() {
        bytes.extend(decode_hex_token(token)?);
    }
    Ok(bytes)
}
