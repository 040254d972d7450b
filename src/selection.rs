//! Frame selection.
//!
//! [`select_frames`] is the even-spacing algorithm: given the number of
//! frames in a video and a cap on how many to keep, it returns indices spread
//! as uniformly as possible across the whole video, always anchored at the
//! first and last frame. [`FrameSelection`] wraps it together with the
//! simpler "every frame" and "first N frames" policies.
//!
//! Nothing here touches I/O, so every policy can be tested on plain numbers.
//!
//! # Example
//!
//! ```
//! use videotoframes::select_frames;
//!
//! let indices = select_frames(10, Some(4))?;
//! assert_eq!(indices.into_iter().collect::<Vec<_>>(), vec![0, 3, 6, 9]);
//! # Ok::<(), videotoframes::ExtractError>(())
//! ```

use std::collections::BTreeSet;

use crate::error::ExtractError;

/// Select up to `max_frames` evenly spaced indices out of `frame_count`.
///
/// With `max_frames` unset, or at least `frame_count`, every index is
/// returned. Otherwise index `i` of the sample lands on
/// `i * (frame_count - 1) / (max_frames - 1)` rounded half-to-even, so the
/// first and last frames are always included. The position is computed from
/// the exact ratio, so a sample falling on `.5` is a true tie. Rounding collisions are
/// collapsed, which can leave fewer than `max_frames` indices.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidArgument`] if `frame_count` is zero or
/// `max_frames` is `Some(0)`.
pub fn select_frames(
    frame_count: u64,
    max_frames: Option<u64>,
) -> Result<BTreeSet<u64>, ExtractError> {
    if frame_count == 0 {
        return Err(ExtractError::InvalidArgument(
            "frame count must be greater than zero".to_string(),
        ));
    }

    let max_frames = match max_frames {
        Some(0) => {
            return Err(ExtractError::InvalidArgument(
                "max frames must be greater than zero".to_string(),
            ));
        }
        Some(max) if max < frame_count => max,
        _ => return Ok((0..frame_count).collect()),
    };

    if max_frames == 1 {
        return Ok(BTreeSet::from([0]));
    }

    let last = frame_count - 1;
    let intervals = max_frames - 1;

    // Positions are `i * last / intervals` with one division, not `i * step`
    // with a pre-divided step: the product form drifts off exact ties
    // (30 frames, 15 kept: 7 * 2.0714... rounds to 15 where 14.5 rounds to 14)
    // and could miss `last`.
    Ok((0..max_frames)
        .map(|i| {
            let position = (i * last) as f64 / intervals as f64;
            (position.round_ties_even() as u64).min(last)
        })
        .collect())
}

/// Which frames of a video to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameSelection {
    /// Every frame of the video. This is the default.
    #[default]
    All,
    /// The first `n` frames (`0..n`).
    First(u64),
    /// Up to `n` frames spread evenly across the video via [`select_frames`].
    Even(u64),
}

impl FrameSelection {
    /// Build a selection from the command-line style pair of a frame limit
    /// and an "even" flag.
    ///
    /// `even` has no effect without a limit.
    pub fn from_limits(max_frames: Option<u64>, even: bool) -> Self {
        match (max_frames, even) {
            (None, _) => FrameSelection::All,
            (Some(max), false) => FrameSelection::First(max),
            (Some(max), true) => FrameSelection::Even(max),
        }
    }

    /// Whether [`indices`](FrameSelection::indices) needs the exact frame
    /// count of the video.
    ///
    /// Only even sampling does; the other policies can be applied while
    /// streaming through the frames.
    pub fn needs_frame_count(&self) -> bool {
        matches!(self, FrameSelection::Even(_))
    }

    /// The largest number of frames this policy can produce, if bounded.
    pub fn limit(&self) -> Option<u64> {
        match self {
            FrameSelection::All => None,
            FrameSelection::First(n) | FrameSelection::Even(n) => Some(*n),
        }
    }

    /// Reject limits of zero.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidArgument`] for `First(0)` or `Even(0)`.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.limit() == Some(0) {
            return Err(ExtractError::InvalidArgument(
                "max frames must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the policy against a video with `frame_count` frames.
    ///
    /// A zero-frame video yields an empty set for [`All`](FrameSelection::All)
    /// and [`First`](FrameSelection::First).
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidArgument`] for a zero limit, or for
    /// [`Even`](FrameSelection::Even) on a zero-frame video.
    pub fn indices(&self, frame_count: u64) -> Result<BTreeSet<u64>, ExtractError> {
        self.validate()?;
        match *self {
            FrameSelection::All => Ok((0..frame_count).collect()),
            FrameSelection::First(n) => Ok((0..n.min(frame_count)).collect()),
            FrameSelection::Even(n) => select_frames(frame_count, Some(n)),
        }
    }

    /// Whether the policy keeps `index` when the frame count is not known.
    ///
    /// Always `true` for [`Even`](FrameSelection::Even); resolve it with
    /// [`indices`](FrameSelection::indices) instead.
    pub(crate) fn keeps_streaming(&self, index: u64) -> bool {
        match *self {
            FrameSelection::First(n) => index < n,
            FrameSelection::All | FrameSelection::Even(_) => true,
        }
    }
}
