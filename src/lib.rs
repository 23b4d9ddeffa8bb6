//! isakmp2pcap - Turn ISAKMP/IKE debug traces into PCAP captures.
//!
//! Network devices can print every ISAKMP message they send or receive as a
//! hex dump in their debug output. This library parses that text into
//! [`TraceRecord`]s and wraps each payload in a synthetic Ethernet/IP/UDP
//! frame so the negotiation can be inspected with ordinary packet tools.
//!
//! # Example
//!
//! ```no_run
//! use isakmp2pcap::pipeline::{run, ConvertOptions, Mode};
//! use isakmp2pcap::synth::SynthConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let options = ConvertOptions {
//!         mode: Mode::Convert { output: "ike.pcap".into() },
//!         synth: SynthConfig::default(),
//!     };
//!     let summary = run("ike-debug.log", &options)?;
//!     println!("{} records", summary.records);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  trace/     - line-driven parser, TraceRecord                       |
//! |  synth/     - Ethernet/IP/UDP frame synthesis                       |
//! |  pcap/      - classic libpcap writer                                |
//! |  pipeline   - single-pass convert / preview driver                  |
//! |  cli/       - argument parsing, preview formatting                  |
//! |  format/    - MAC address formatting                                |
//! |  error      - error types                                           |
//! +---------------------------------------------------------------------+
//! ```

pub mod cli;
pub mod error;
pub mod format;
pub mod pcap;
pub mod pipeline;
pub mod synth;
pub mod trace;

pub use error::{Error, PcapError, Result, SynthError, TraceError};
pub use pcap::PcapWriter;
pub use pipeline::{ConvertOptions, Mode, RecordSink, Summary};
pub use synth::{PacketSynthesizer, SynthConfig, SyntheticFrame};
pub use trace::{Direction, TraceParser, TraceReader, TraceRecord};
