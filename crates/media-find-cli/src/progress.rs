//! Progress bar reporting for the scan

use indicatif::{ProgressBar, ProgressStyle};
use media_find_core::{ProgressSink, ScanProgress};

/// Feeds scan progress into an indicatif bar
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// Visible bar sized to the number of files to probe
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} probed | {msg}",
            )
            .unwrap()
            .progress_chars("#>-"),
        );
        bar.set_message("found: 0");
        Self { bar }
    }

    /// No-op bar for `--no-progress`
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Handle for printing above the bar without tearing it
    pub fn bar(&self) -> ProgressBar {
        self.bar.clone()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BarProgress {
    fn on_progress(&self, progress: ScanProgress) {
        self.bar.set_position(progress.completed as u64);
        self.bar.set_message(format!("found: {}", progress.accepted));
    }
}
