//! Upload progress display.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

/// Byte-granular progress over a fixed total.
///
/// Cloneable so the transport callback can own a handle. The position is
/// monotonically non-decreasing and clamps at the total, so a duplicate or
/// late callback can never push the bar past 100%.
#[derive(Clone)]
pub struct UploadProgress {
    bar: ProgressBar,
    sent: Arc<AtomicU64>,
    total: u64,
}

impl UploadProgress {
    /// Create a visible progress bar for `total` bytes.
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:.yellow} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%)")
                .expect("valid progress template")
                .progress_chars("=> "),
        );
        bar.set_message("Uploading");
        Self::with_bar(bar, total)
    }

    /// Progress accounting without terminal output.
    pub fn hidden(total: u64) -> Self {
        Self::with_bar(ProgressBar::hidden(), total)
    }

    fn with_bar(bar: ProgressBar, total: u64) -> Self {
        Self {
            bar,
            sent: Arc::new(AtomicU64::new(0)),
            total,
        }
    }

    /// Advance by `delta` bytes, clamped at the total.
    ///
    /// Progress is ticked from one task at a time, so a load/store pair is
    /// enough; the atomic only carries the count across the callback clone.
    pub fn advance(&self, delta: u64) {
        let sent = self
            .sent
            .load(Ordering::Acquire)
            .saturating_add(delta)
            .min(self.total);
        self.sent.store(sent, Ordering::Release);
        self.bar.set_position(sent);
    }

    /// Bytes reported so far.
    pub fn position(&self) -> u64 {
        self.sent.load(Ordering::Acquire)
    }

    /// Complete the bar and release the terminal line.
    pub fn finish(&self) {
        self.bar.finish_with_message("Uploaded");
    }
}
