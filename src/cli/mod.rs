//! Command-line interface module.
//!
//! This module handles:
//! - Argument parsing via clap
//! - Preview output formatting (text, JSON)

mod args;
mod output;

pub use args::Args;
pub use output::{OutputFormat, RecordFormatter};
