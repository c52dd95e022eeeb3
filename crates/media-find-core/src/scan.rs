//! Scan driver: probes many files concurrently and collects the matches
//!
//! Each file becomes one task for the bounded executor: check the shared
//! early-stop condition, probe, evaluate, then atomically commit the
//! acceptance. Probe failures are contained per file and logged, never
//! fatal. Early stop is cooperative: a file whose probe is already running
//! when the cap fills still completes, its result is discarded at commit
//! time, and no in-flight ffprobe process is ever killed.

use crate::error::ScanError;
use crate::evaluate::{evaluate, Query, StreamCounts};
use crate::executor::run_bounded;
use async_trait::async_trait;
use media_find_common::{InspectError, ProbeReport};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// External collaborator that inspects one media file
#[async_trait]
pub trait MediaInspector: Send + Sync {
    async fn inspect(&self, path: &Path) -> Result<ProbeReport, InspectError>;
}

/// One accepted file with its per-kind stream match counts
#[derive(Debug, Clone, Serialize)]
pub struct MatchedFile {
    pub path: PathBuf,
    pub stream_counts: StreamCounts,
}

/// Running totals reported after every task completion
#[derive(Debug, Clone, Copy)]
pub struct ScanProgress {
    pub total: usize,
    pub completed: usize,
    pub accepted: usize,
}

/// Observer notified once per task completion, in completion order.
/// Must not block the scan materially.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: ScanProgress);
}

impl ProgressSink for () {
    fn on_progress(&self, _progress: ScanProgress) {}
}

/// Observer notified for every accepted file, in acceptance order
pub trait ResultSink: Send + Sync {
    fn on_match(&self, matched: &MatchedFile);
}

impl ResultSink for () {
    fn on_match(&self, _matched: &MatchedFile) {}
}

/// Scan configuration
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum number of concurrent probes
    pub parallelism: usize,
    /// Stop accepting once this many files matched; `None` is unbounded
    pub max_results: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            parallelism: num_cpus::get(),
            max_results: None,
        }
    }
}

/// Per-file outcome, in input order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskDisposition {
    /// Accepted and counted toward the result cap
    Matched,
    /// Probed, did not satisfy the query
    NoMatch,
    /// Short-circuited by the early-stop check, or lost the commit race
    Skipped,
    /// Probe failed; logged and treated as not matching
    Failed,
}

/// Everything one scan produced
#[derive(Debug)]
pub struct ScanReport {
    /// Accepted files in acceptance order
    pub matches: Vec<MatchedFile>,
    /// Per-input-file outcome, in input order
    pub dispositions: Vec<TaskDisposition>,
}

impl ScanReport {
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.dispositions
            .iter()
            .filter(|d| **d == TaskDisposition::Failed)
            .count()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.dispositions
            .iter()
            .filter(|d| **d == TaskDisposition::Skipped)
            .count()
    }
}

/// Shared per-run state. The accepted counter and the match list are
/// mutated only inside single critical sections, so two tasks can never
/// both pass the cap check and both commit.
struct ScanState {
    total: usize,
    inner: Mutex<ScanStateInner>,
}

struct ScanStateInner {
    accepted: usize,
    matches: Vec<MatchedFile>,
}

impl ScanState {
    fn new(total: usize) -> Self {
        Self {
            total,
            inner: Mutex::new(ScanStateInner {
                accepted: 0,
                matches: Vec::new(),
            }),
        }
    }

    /// Advisory early-stop check at task entry
    fn should_probe(&self, max_results: Option<usize>) -> bool {
        match max_results {
            None => true,
            Some(max) => self.inner.lock().unwrap().accepted < max,
        }
    }

    /// Check-and-commit in one critical section; `false` means the cap
    /// filled between the entry check and this commit
    fn try_accept(&self, matched: MatchedFile, max_results: Option<usize>) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if let Some(max) = max_results {
            if inner.accepted >= max {
                return false;
            }
        }
        inner.accepted += 1;
        inner.matches.push(matched);
        true
    }

    fn progress(&self, completed: usize) -> ScanProgress {
        ScanProgress {
            total: self.total,
            completed,
            accepted: self.inner.lock().unwrap().accepted,
        }
    }

    fn into_matches(self) -> Vec<MatchedFile> {
        self.inner.into_inner().unwrap().matches
    }
}

/// Probe `files` against `query` with bounded concurrency.
///
/// Returns the accepted files (in acceptance order) plus a per-file
/// disposition list (in input order). Only unexpected task failures
/// surface as `ScanError`; probe errors are contained per file.
pub async fn scan(
    inspector: &dyn MediaInspector,
    files: Vec<PathBuf>,
    query: &Query,
    options: &ScanOptions,
    progress: &dyn ProgressSink,
    results: &dyn ResultSink,
) -> Result<ScanReport, ScanError> {
    let state = ScanState::new(files.len());
    let max_results = options.max_results;
    let state_ref = &state;

    let factories: Vec<_> = files
        .into_iter()
        .map(|path| {
            move || async move {
                // expected failures are contained below, so the error type
                // only needs pinning for the executor
                if !state_ref.should_probe(max_results) {
                    return Ok::<TaskDisposition, ScanError>(TaskDisposition::Skipped);
                }

                let report = match inspector.inspect(&path).await {
                    Ok(report) => report,
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "probe failed");
                        return Ok(TaskDisposition::Failed);
                    }
                };

                match evaluate(&report, query) {
                    Some(stream_counts) => {
                        let matched = MatchedFile {
                            path,
                            stream_counts,
                        };
                        if state_ref.try_accept(matched.clone(), max_results) {
                            results.on_match(&matched);
                            Ok(TaskDisposition::Matched)
                        } else {
                            Ok(TaskDisposition::Skipped)
                        }
                    }
                    None => Ok(TaskDisposition::NoMatch),
                }
            }
        })
        .collect();

    let dispositions = run_bounded(factories, options.parallelism, |completed| {
        progress.on_progress(state_ref.progress(completed));
    })
    .await?;

    Ok(ScanReport {
        matches: state.into_matches(),
        dispositions,
    })
}
