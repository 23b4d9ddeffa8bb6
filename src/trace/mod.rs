//! ISAKMP debug trace parsing.
//!
//! This module turns the line-oriented debug output of a network device into
//! [`TraceRecord`]s:
//! - [`TraceParser`] is the push-style state machine, fed one line at a time
//! - [`TraceReader`] wraps it as an iterator over any `BufRead`

mod parser;
mod reader;
mod record;

pub use parser::{decode_hex_token, ParseState, TraceParser};
pub use reader::TraceReader;
pub use record::{Direction, TraceRecord};
