//! isakmp2pcap CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use isakmp2pcap::cli::Args;
use isakmp2pcap::format::format_mac;
use isakmp2pcap::pipeline::{self, Mode};

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging; stdout is reserved for preview output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = args.to_options();
    tracing::debug!(
        local_mac = %format_mac(&options.synth.local_mac),
        remote_mac = %format_mac(&options.synth.remote_mac),
        "synthetic link addresses"
    );

    match &options.mode {
        Mode::Convert { output } => {
            let summary = pipeline::run(&args.input, &options).with_context(|| {
                format!(
                    "Failed to convert {} to {}",
                    args.input.display(),
                    output.display()
                )
            })?;
            eprintln!(
                "Exported {} records to {}",
                summary.records,
                output.display()
            );
        }
        Mode::Preview { .. } => {
            let summary = pipeline::run(&args.input, &options)
                .with_context(|| format!("Failed to read trace {}", args.input.display()))?;
            eprintln!("{} records", summary.records);
        }
    }

    Ok(())
}
