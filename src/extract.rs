//! Frame extraction.
//!
//! [`extract_video`] drives one [`VideoSource`] into one [`ImageSink`]
//! according to the configured [`FrameSelection`](crate::FrameSelection).
//! [`extract_paths`] repeats that for a list of files and [`extract_all`] is
//! the whole pipeline: resolve the input path, create the output directory,
//! decode every video with FFmpeg.
//!
//! # Example
//!
//! ```no_run
//! use videotoframes::{ExtractOptions, FrameSelection};
//!
//! let options = ExtractOptions::new().with_selection(FrameSelection::Even(10));
//! let report = videotoframes::extract_all("videos/", "frames/", &options)?;
//! println!("wrote {} frames", report.total_frames());
//! # Ok::<(), videotoframes::ExtractError>(())
//! ```

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use crate::{
    config::ExtractOptions,
    decoder::FfmpegSource,
    discovery::{find_videos, video_stem},
    error::ExtractError,
    progress::ProgressTracker,
    selection::FrameSelection,
    sink::{DirectorySink, ImageSink},
    source::VideoSource,
};

/// What was written for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReport {
    /// File the frames came from, when extracted by path.
    pub source: Option<PathBuf>,
    /// Stem used to name the frame files.
    pub stem: String,
    /// Exact frame count, when the selection needed it.
    pub frame_count: Option<u64>,
    /// Written frames as `(index, path)`, in ascending index order.
    pub frames: Vec<(u64, PathBuf)>,
}

impl VideoReport {
    /// Indices of the written frames.
    pub fn indices(&self) -> impl Iterator<Item = u64> + '_ {
        self.frames.iter().map(|(index, _)| *index)
    }
}

/// What was written for a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Directory the frames were written into.
    pub output: PathBuf,
    /// One report per video, in processing order.
    pub videos: Vec<VideoReport>,
}

impl ExtractionReport {
    /// Number of frame files written across all videos.
    pub fn total_frames(&self) -> usize {
        self.videos.iter().map(|video| video.frames.len()).sum()
    }
}

/// Frames still to be written for one video.
enum Pending {
    /// An explicit index set (even sampling).
    Set(BTreeSet<u64>),
    /// Decided frame by frame (all frames, or a prefix).
    Streaming(FrameSelection),
}

impl Pending {
    fn keeps(&self, index: u64) -> bool {
        match self {
            Pending::Set(set) => set.contains(&index),
            Pending::Streaming(selection) => selection.keeps_streaming(index),
        }
    }

    /// Whether no frame after `index` can be kept.
    fn is_exhausted_after(&self, index: u64) -> bool {
        match self {
            Pending::Set(set) => set.last().is_none_or(|&last| index >= last),
            Pending::Streaming(selection) => selection
                .limit()
                .is_some_and(|limit| index.saturating_add(1) >= limit),
        }
    }
}

/// Extract the selected frames of one video into `sink`.
///
/// Frames are decoded in order and only the selected ones are converted and
/// written. Decoding stops as soon as the last selected frame is written.
/// The cancellation token is checked before each frame.
///
/// An even selection on a video with no frames writes nothing.
///
/// # Errors
///
/// - [`ExtractError::InvalidArgument`] for a zero frame limit.
/// - [`ExtractError::Cancelled`] if cancellation was requested.
/// - Any decode error from the source or write error from the sink; the
///   video is abandoned at the first one.
pub fn extract_video<S, K>(
    source: &mut S,
    stem: &str,
    sink: &mut K,
    options: &ExtractOptions,
) -> Result<VideoReport, ExtractError>
where
    S: VideoSource + ?Sized,
    K: ImageSink + ?Sized,
{
    let selection = options.selection;
    selection.validate()?;

    if options.is_cancelled() {
        return Err(ExtractError::Cancelled);
    }

    let mut frame_count = None;
    let pending = if selection.needs_frame_count() {
        let count = source.frame_count()?;
        frame_count = Some(count);
        if count == 0 {
            log::warn!("{stem} has no frames; nothing to extract");
            Pending::Set(BTreeSet::new())
        } else {
            Pending::Set(selection.indices(count)?)
        }
    } else {
        Pending::Streaming(selection)
    };

    let expected = match &pending {
        Pending::Set(set) => Some(set.len() as u64),
        Pending::Streaming(selection) => {
            let declared = source.info().declared_frame_count;
            match (selection.limit(), declared) {
                (Some(limit), Some(declared)) => Some(limit.min(declared)),
                (limit, declared) => limit.or(declared),
            }
        }
    };

    log::debug!("Extracting {stem} with {selection:?}, expecting {expected:?} frame(s)");

    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        stem,
        expected,
        options.batch_size,
    );

    let mut frames = Vec::new();
    let mut done = matches!(&pending, Pending::Set(set) if set.is_empty());

    while !done {
        if options.is_cancelled() {
            return Err(ExtractError::Cancelled);
        }

        let Some(index) = source.next_frame()? else {
            break;
        };

        if pending.keeps(index) {
            let image = source.current_image()?;
            let path = sink.write_frame(stem, index, &image)?;
            tracker.frame_written(index);
            frames.push((index, path));
        }

        done = pending.is_exhausted_after(index);
    }

    tracker.finish();

    if let Pending::Set(set) = &pending {
        let missing = set.len() - frames.len();
        if missing > 0 {
            log::warn!(
                "{stem} ended early: {missing} selected frame(s) could not be decoded"
            );
        }
    }

    log::info!("Extracted {} frame(s) from {stem}", frames.len());

    Ok(VideoReport {
        source: None,
        stem: stem.to_string(),
        frame_count,
        frames,
    })
}

/// Extract every video in `videos`, in order, opening each with `open`.
///
/// Each video's stem is its file name without extension.
///
/// # Errors
///
/// Stops at the first video that fails to open or extract.
pub fn extract_paths<S, F, K>(
    videos: &[PathBuf],
    mut open: F,
    sink: &mut K,
    options: &ExtractOptions,
) -> Result<Vec<VideoReport>, ExtractError>
where
    S: VideoSource,
    F: FnMut(&Path) -> Result<S, ExtractError>,
    K: ImageSink + ?Sized,
{
    let mut reports = Vec::with_capacity(videos.len());
    for path in videos {
        let mut source = open(path)?;
        let mut report = extract_video(&mut source, &video_stem(path), sink, options)?;
        report.source = Some(path.clone());
        reports.push(report);
    }
    Ok(reports)
}

/// Extract frames from every video under `input` into `output`.
///
/// `input` may be a single file or a directory (scanned non-recursively).
/// The output directory is created only once at least one video was found.
///
/// # Errors
///
/// - [`ExtractError::NoVideoSelected`] if `input` holds no video files.
/// - Any error from [`extract_video`] or from opening a video.
pub fn extract_all<P, Q>(
    input: P,
    output: Q,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    options.selection.validate()?;

    let videos = find_videos(input.as_ref())?;
    if videos.is_empty() {
        return Err(ExtractError::NoVideoSelected);
    }

    let mut sink = DirectorySink::from_options(output.as_ref(), options)?;
    let reports = extract_paths(
        &videos,
        |path: &Path| FfmpegSource::open(path),
        &mut sink,
        options,
    )?;

    Ok(ExtractionReport {
        output: sink.directory().to_path_buf(),
        videos: reports,
    })
}
