//! Progress callbacks and cooperative cancellation.
//!
//! An extraction reports to a [`ProgressCallback`] as frame files are
//! written, one [`ProgressInfo`] per batch and a last one when the video is
//! done. A [`CancellationToken`] shared with another thread (a Ctrl-C
//! handler, a UI) stops the extraction before the next frame is decoded.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use videotoframes::{ExtractOptions, ProgressCallback, ProgressInfo};
//!
//! struct Percent;
//!
//! impl ProgressCallback for Percent {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         match info.percentage {
//!             Some(done) => eprintln!("{} {done:.0}%", info.stem),
//!             None => eprintln!("{} {} frames", info.stem, info.frames_written),
//!         }
//!     }
//! }
//!
//! let options = ExtractOptions::new().with_progress(Arc::new(Percent));
//! videotoframes::extract_all("clip.mp4", "frames", &options)?;
//! # Ok::<(), videotoframes::ExtractError>(())
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// Where the extraction of one video stands.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    /// Stem of the video, as used in its frame file names.
    pub stem: String,
    /// Frame files written so far for this video.
    pub frames_written: u64,
    /// Frame files this video should produce, when that is known up front.
    pub frames_expected: Option<u64>,
    /// `frames_written` as a share of `frames_expected`, in percent.
    pub percentage: Option<f32>,
    /// Time since the video was opened for extraction.
    pub elapsed: Duration,
    /// Remaining time extrapolated from the rate so far.
    pub estimated_remaining: Option<Duration>,
    /// Index of the last frame written; `None` in the closing report.
    pub last_frame: Option<u64>,
}

/// Observer of extraction progress.
///
/// Reports arrive on the thread doing the extraction, which with the
/// `rayon` feature is a pool worker, hence `Send + Sync`. Returning from the
/// callback never stops the work; cancel a [`CancellationToken`] instead.
pub trait ProgressCallback: Send + Sync {
    /// Receive one report.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Used when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Shared stop flag for a running extraction.
///
/// Every clone observes the same flag.
///
/// ```
/// use videotoframes::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A fresh token, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the extraction holding this token to stop.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](CancellationToken::cancel) was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Per-video bookkeeping behind the callback.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    stem: String,
    expected: Option<u64>,
    written: u64,
    unreported: u64,
    batch_size: u64,
    started: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        stem: &str,
        expected: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            stem: stem.to_string(),
            expected,
            written: 0,
            unreported: 0,
            batch_size: batch_size.max(1),
            started: Instant::now(),
        }
    }

    /// Count frame `index` as written; reports once a batch is full.
    pub(crate) fn frame_written(&mut self, index: u64) {
        self.written += 1;
        self.unreported += 1;
        if self.unreported == self.batch_size {
            self.unreported = 0;
            self.emit(Some(index));
        }
    }

    /// Closing report for the video.
    pub(crate) fn finish(&mut self) {
        self.unreported = 0;
        self.emit(None);
    }

    fn emit(&self, last_frame: Option<u64>) {
        let elapsed = self.started.elapsed();
        let info = ProgressInfo {
            stem: self.stem.clone(),
            frames_written: self.written,
            frames_expected: self.expected,
            percentage: percentage(self.written, self.expected),
            elapsed,
            estimated_remaining: remaining_time(elapsed, self.written, self.expected),
            last_frame,
        };
        self.callback.on_progress(&info);
    }
}

fn percentage(done: u64, expected: Option<u64>) -> Option<f32> {
    match expected {
        Some(expected) if expected > 0 => Some(done as f32 * 100.0 / expected as f32),
        _ => None,
    }
}

fn remaining_time(elapsed: Duration, done: u64, expected: Option<u64>) -> Option<Duration> {
    let expected = expected?;
    if done == 0 {
        return None;
    }
    let left = expected.saturating_sub(done);
    Some(elapsed.mul_f64(left as f64 / done as f64))
}
