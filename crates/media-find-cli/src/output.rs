//! Result formatting and writing

use anyhow::{Context as _, Result};
use indicatif::ProgressBar;
use media_find_core::{MatchedFile, ResultSink};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Output format for matched files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One path per line
    Text,
    /// One JSON object per line, including per-kind stream counts
    Jsonl,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "text" => Ok(OutputFormat::Text),
            "jsonl" => Ok(OutputFormat::Jsonl),
            other => anyhow::bail!("unknown output format: {other} (expected text or jsonl)"),
        }
    }
}

/// Streams each accepted file as a JSONL line the moment it is accepted.
/// Writes to its own writer while the progress bar is suspended, so lines
/// reach the writer whether or not a bar is drawn.
pub struct JsonlStream<W: Write> {
    bar: ProgressBar,
    out: Mutex<W>,
}

impl JsonlStream<io::Stdout> {
    pub fn stdout(bar: ProgressBar) -> Self {
        Self::new(bar, io::stdout())
    }
}

impl<W: Write> JsonlStream<W> {
    pub fn new(bar: ProgressBar, out: W) -> Self {
        Self {
            bar,
            out: Mutex::new(out),
        }
    }
}

impl<W: Write + Send> ResultSink for JsonlStream<W> {
    fn on_match(&self, matched: &MatchedFile) {
        let line = match serde_json::to_string(matched) {
            Ok(line) => line,
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize match");
                return;
            }
        };
        // a visible bar is cleared for the write and redrawn after, so the
        // line and the bar never interleave; a hidden bar suspends as a no-op
        self.bar.suspend(|| {
            let mut out = self.out.lock().unwrap();
            if let Err(err) = writeln!(out, "{line}") {
                tracing::error!(error = %err, "failed to write match");
            }
        });
    }
}

/// Render all matches in the given format
pub fn render(matches: &[MatchedFile], format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    for matched in matches {
        match format {
            OutputFormat::Text => {
                let _ = writeln!(out, "{}", matched.path.display());
            }
            OutputFormat::Jsonl => {
                let _ = writeln!(out, "{}", serde_json::to_string(matched)?);
            }
        }
    }
    Ok(out)
}

/// Write rendered matches to a file
pub fn write_to_file(path: &Path, rendered: &str) -> Result<()> {
    std::fs::write(path, rendered)
        .with_context(|| format!("failed to write results to {}", path.display()))
}
