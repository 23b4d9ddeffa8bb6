//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

use super::OutputFormat;
use crate::format::parse_mac;
use crate::pipeline::{ConvertOptions, Mode};
use crate::synth::{SynthConfig, DEFAULT_LOCAL_MAC, DEFAULT_REMOTE_MAC};

/// Convert ISAKMP/IKE debug traces into PCAP captures.
#[derive(Parser, Debug)]
#[command(name = "isakmp2pcap")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Debug trace to convert
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output capture file (default: INPUT with `.pcap` appended)
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// Print the parsed records instead of writing a capture
    #[arg(short = 'p', long = "preview")]
    pub preview: bool,

    /// Preview output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// MAC address used for the logging device
    #[arg(long = "local-mac", value_name = "MAC", value_parser = parse_mac)]
    pub local_mac: Option<[u8; 6]>,

    /// MAC address used for the peer
    #[arg(long = "remote-mac", value_name = "MAC", value_parser = parse_mac)]
    pub remote_mac: Option<[u8; 6]>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Output path, defaulting to the input path with `.pcap` appended.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let mut path = self.input.clone().into_os_string();
            path.push(".pcap");
            PathBuf::from(path)
        })
    }

    /// Log filter matching the `-v` count.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Build pipeline options from the parsed arguments.
    pub fn to_options(&self) -> ConvertOptions {
        let synth = SynthConfig::new()
            .local_mac(self.local_mac.unwrap_or(DEFAULT_LOCAL_MAC))
            .remote_mac(self.remote_mac.unwrap_or(DEFAULT_REMOTE_MAC));

        let mode = if self.preview {
            Mode::Preview {
                format: self.format,
            }
        } else {
            Mode::Convert {
                output: self.output_path(),
            }
        };

        ConvertOptions { mode, synth }
    }
}
