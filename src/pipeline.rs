//! Trace-to-capture pipeline.
//!
//! One pass over the input: each record is handed to a [`RecordSink`] as soon
//! as the parser completes it. Converting and previewing share this path and
//! differ only in the sink.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cli::{OutputFormat, RecordFormatter};
use crate::error::{Error, Result};
use crate::pcap::{Linktype, PcapWriter, DEFAULT_SNAPLEN};
use crate::synth::{PacketSynthesizer, SynthConfig};
use crate::trace::{TraceReader, TraceRecord};

/// What to do with the parsed records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Synthesize frames and write them to a capture file.
    Convert { output: PathBuf },
    /// Print the records to stdout without writing anything.
    Preview { format: OutputFormat },
}

/// Options for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub mode: Mode,
    pub synth: SynthConfig,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// Records parsed (and frames written, in convert mode).
    pub records: usize,
    /// Input lines read.
    pub lines: usize,
}

/// Consumer of completed trace records.
pub trait RecordSink {
    /// Handle one record. An error aborts the run.
    fn accept(&mut self, record: &TraceRecord) -> Result<()>;
}

/// Synthesizes a frame per record and streams it into a capture.
pub struct CaptureSink<W: Write> {
    synthesizer: PacketSynthesizer,
    writer: PcapWriter<W>,
}

impl<W: Write> CaptureSink<W> {
    /// Start a capture on `inner`; the global header is written immediately.
    pub fn new(inner: W, config: SynthConfig) -> Result<Self> {
        let mut writer = PcapWriter::new(inner);
        writer.write_global_header(DEFAULT_SNAPLEN, Linktype::ETHERNET)?;
        Ok(Self {
            synthesizer: PacketSynthesizer::new(config),
            writer,
        })
    }

    /// Flush the capture and return the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.writer.finish()
    }
}

impl<W: Write> RecordSink for CaptureSink<W> {
    fn accept(&mut self, record: &TraceRecord) -> Result<()> {
        let frame = self.synthesizer.synthesize(record)?;
        self.writer.write_frame(&frame)
    }
}

/// Prints each record with a [`RecordFormatter`].
pub struct PreviewSink<W: Write> {
    formatter: RecordFormatter,
    writer: W,
}

impl<W: Write> PreviewSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            formatter: RecordFormatter::new(format),
            writer,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for PreviewSink<W> {
    fn accept(&mut self, record: &TraceRecord) -> Result<()> {
        self.formatter.write(record, &mut self.writer)?;
        Ok(())
    }
}

/// Drive every record of `input` into `sink`.
///
/// Stops at the first error; records already accepted are not rolled back.
pub fn process<R: BufRead, S: RecordSink>(input: R, sink: &mut S) -> Result<Summary> {
    let mut reader = TraceReader::new(input);
    let mut records = 0;

    while let Some(record) = reader.next_record()? {
        sink.accept(&record)?;
        records += 1;
    }

    Ok(Summary {
        records,
        lines: reader.parser().line_number(),
    })
}

/// Convert a trace held in memory or any reader into capture bytes.
pub fn convert<R: BufRead, W: Write>(input: R, output: W, config: SynthConfig) -> Result<(W, Summary)> {
    let mut sink = CaptureSink::new(output, config)?;
    let summary = process(input, &mut sink)?;
    Ok((sink.finish()?, summary))
}

/// Run the pipeline on a trace file.
///
/// In convert mode the capture is written to a temporary file beside the
/// destination and renamed into place only when every record has been
/// written, so a failed run never leaves a truncated capture behind.
pub fn run<P: AsRef<Path>>(input: P, options: &ConvertOptions) -> Result<Summary> {
    let input = input.as_ref();
    let file = File::open(input).map_err(|source| Error::Open {
        path: input.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(file);

    match &options.mode {
        Mode::Convert { output } => convert_to_file(reader, output, options.synth),
        Mode::Preview { format } => {
            let stdout = io::stdout();
            let mut sink = PreviewSink::new(stdout.lock(), *format);
            let summary = process(reader, &mut sink)?;
            sink.into_inner().flush()?;
            Ok(summary)
        }
    }
}

fn convert_to_file<R: BufRead>(input: R, output: &Path, config: SynthConfig) -> Result<Summary> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = tempfile::Builder::new()
        .prefix(".isakmp2pcap-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    debug!(temp = %temp.path().display(), "writing capture to temporary file");

    let (buffered, summary) = convert(input, BufWriter::new(temp), config)?;
    let temp = buffered.into_inner().map_err(|e| e.into_error())?;
    temp.persist(output).map_err(|e| Error::Io(e.error))?;

    info!(
        records = summary.records,
        output = %output.display(),
        "capture written"
    );
    Ok(summary)
}
