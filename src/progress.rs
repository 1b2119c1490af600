//! Progress bar display for fleet runs

use indicatif::{ProgressBar, ProgressStyle};

/// Counts finished workflows while the fleet runs.
///
/// Cheap to clone; every clone drives the same bar. Draws to stderr and stays
/// invisible when stderr is not a terminal.
#[derive(Debug, Clone)]
pub struct FleetProgress {
    bar: ProgressBar,
}

impl FleetProgress {
    /// Create a progress display for `total` workflows
    pub fn new(total: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(total);
        bar.set_style(style);
        Self { bar }
    }

    /// A display that never draws
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Mark the workflow for `address` as finished
    pub fn finish_target(&self, address: &str) {
        self.bar.set_message(address.to_string());
        self.bar.inc(1);
    }

    #[cfg(test)]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Clear the bar before the summary is printed
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
