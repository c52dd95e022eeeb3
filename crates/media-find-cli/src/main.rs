//! media-find - Find media files whose streams match a query
//!
//! Scans a directory for files with the given extensions, probes each one
//! with ffprobe under a concurrency limit, and reports the files whose
//! container and streams satisfy the supplied patterns.

use anyhow::{Context as _, Result};
use clap::Parser;
use media_find_common::StreamKind;
use media_find_core::{scan, Pattern, Query, ScanOptions};
use media_find_probe::Ffprobe;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod discover;
mod output;
mod progress;

use discover::discover_files;
use output::{render, write_to_file, JsonlStream, OutputFormat};
use progress::BarProgress;

#[derive(Parser)]
#[command(
    name = "media-find",
    version,
    about = "Find media files whose probed streams match a query",
    long_about = "Recursively scans a directory for media files, runs ffprobe on each one\n\
                  with a bounded number of concurrent processes, and reports the files\n\
                  whose container and streams satisfy the supplied patterns.\n\n\
                  Pattern values support operator prefixes:\n  \
                  >=N >N <=N <N   numeric comparison\n  \
                  ~TEXT           case-insensitive substring\n  \
                  !TEXT           case-insensitive inequality\n  \
                  TEXT            case-insensitive equality\n\n\
                  A dot in the field name addresses nested records, e.g. tags.language.\n\
                  Note there is no escape syntax: a literal value starting with >, <, ~,\n\
                  or ! is always read as an operator.",
    after_help = "EXAMPLES:\n  \
                  # All divx videos in avi or mp4 containers\n  \
                  media-find -x avi,mp4 -v codec_name=divx /media/videos\n\n  \
                  # h264 main-profile video with eac3 audio in an mkv container\n  \
                  media-find -x mkv -v codec_name=h264 -v profile=main -a codec_name=eac3 /media/videos\n\n  \
                  # First five 1080p-or-better files with English subtitles\n  \
                  media-find -x mkv -v \"width=>=1920\" -s tags.language=eng -m 5 /media/videos\n\n  \
                  # Stream results as JSON lines\n  \
                  media-find -x mkv -c format_name=~matroska --format jsonl /media/videos"
)]
struct Cli {
    /// Directory to scan
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// Comma-separated list of file extensions to scan
    #[arg(short = 'x', long, value_delimiter = ',', required = true)]
    extensions: Vec<String>,

    /// Video stream pattern, repeatable (e.g. -v codec_name=h264)
    #[arg(short = 'v', long = "video", value_name = "FIELD=VALUE")]
    video: Vec<String>,

    /// Audio stream pattern, repeatable (e.g. -a codec_name=eac3)
    #[arg(short = 'a', long = "audio", value_name = "FIELD=VALUE")]
    audio: Vec<String>,

    /// Subtitle stream pattern, repeatable (e.g. -s tags.language=eng)
    #[arg(short = 's', long = "subtitle", value_name = "FIELD=VALUE")]
    subtitle: Vec<String>,

    /// Container ("format") pattern, repeatable (e.g. -c format_name=~matroska)
    #[arg(short = 'c', long = "container", value_name = "FIELD=VALUE")]
    container: Vec<String>,

    /// Stop after this many matches
    #[arg(short = 'm', long)]
    max_results: Option<usize>,

    /// Number of concurrent ffprobe processes
    #[arg(short = 'p', long, default_value_t = num_cpus::get())]
    processes: usize,

    /// Write results to a file instead of stdout
    #[arg(short = 'o', long)]
    out: Option<PathBuf>,

    /// Output format: text (default) or jsonl (JSON lines)
    #[arg(long, default_value = "text")]
    format: String,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// ffprobe binary to invoke
    #[arg(long, default_value = "ffprobe")]
    ffprobe: String,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn build_query(&self) -> Result<Query> {
        let mut streams = BTreeMap::new();
        let per_kind = [
            (StreamKind::Video, &self.video),
            (StreamKind::Audio, &self.audio),
            (StreamKind::Subtitle, &self.subtitle),
        ];
        for (kind, specs) in per_kind {
            if !specs.is_empty() {
                let pattern = Pattern::from_specs(specs)
                    .with_context(|| format!("invalid --{kind} pattern"))?;
                streams.insert(kind, pattern);
            }
        }

        let container = if self.container.is_empty() {
            None
        } else {
            Some(Pattern::from_specs(&self.container).context("invalid --container pattern")?)
        };

        let query = Query { container, streams };
        if query.is_empty() {
            anyhow::bail!(
                "at least one --video, --audio, --subtitle, or --container pattern must be specified"
            );
        }
        Ok(query)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let format = OutputFormat::parse(&cli.format)?;
    let query = cli.build_query()?;

    let files = discover_files(&cli.root, &cli.extensions);
    info!(
        "Found {} files matching extensions: {}",
        files.len(),
        cli.extensions.join(",")
    );
    info!("Probing with up to {} concurrent processes", cli.processes);

    let bar = if cli.no_progress {
        BarProgress::hidden()
    } else {
        BarProgress::new(files.len())
    };
    let inspector = Ffprobe::with_binary(&cli.ffprobe);
    let options = ScanOptions {
        parallelism: cli.processes,
        max_results: cli.max_results,
    };

    // stream matches to stdout as they are accepted when writing JSONL;
    // otherwise everything is written once the scan finishes
    let streaming = (format == OutputFormat::Jsonl && cli.out.is_none())
        .then(|| JsonlStream::stdout(bar.bar()));

    let report = match &streaming {
        Some(sink) => scan(&inspector, files, &query, &options, &bar, sink).await?,
        None => scan(&inspector, files, &query, &options, &bar, &()).await?,
    };
    bar.finish();

    info!(
        "Found {} matching files ({} probe failures, {} skipped)",
        report.matches.len(),
        report.failed_count(),
        report.skipped_count()
    );

    if let Some(out) = &cli.out {
        write_to_file(out, &render(&report.matches, format)?)?;
        info!("Results written to {}", out.display());
    } else if streaming.is_none() {
        print!("{}", render(&report.matches, format)?);
    }

    Ok(())
}
