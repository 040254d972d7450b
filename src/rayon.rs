//! Parallel extraction across videos.
//!
//! Each worker opens its own source and writes through its own clone of the
//! sink, so no decoder state is shared between threads. Frames of a single
//! video are still decoded sequentially.

use std::path::{Path, PathBuf};

use ::rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    config::ExtractOptions,
    decoder::FfmpegSource,
    discovery::{find_videos, video_stem},
    error::ExtractError,
    extract::{ExtractionReport, VideoReport, extract_video},
    sink::{DirectorySink, ImageSink},
    source::VideoSource,
};

/// Parallel counterpart of [`extract_paths`](crate::extract_paths).
///
/// Videos are distributed across the rayon thread pool; the returned
/// reports keep the order of `videos`.
///
/// # Errors
///
/// Returns one of the errors raised by the workers if any video fails.
pub fn extract_paths_parallel<S, F, K>(
    videos: &[PathBuf],
    open: F,
    sink: &K,
    options: &ExtractOptions,
) -> Result<Vec<VideoReport>, ExtractError>
where
    S: VideoSource,
    F: Fn(&Path) -> Result<S, ExtractError> + Sync,
    K: ImageSink + Clone + Sync,
{
    videos
        .par_iter()
        .map(|path| {
            if options.is_cancelled() {
                return Err(ExtractError::Cancelled);
            }
            let mut source = open(path)?;
            let mut sink = sink.clone();
            let mut report = extract_video(&mut source, &video_stem(path), &mut sink, options)?;
            report.source = Some(path.clone());
            Ok(report)
        })
        .collect()
}

/// Parallel counterpart of [`extract_all`](crate::extract_all).
///
/// # Errors
///
/// Same as [`extract_all`](crate::extract_all).
pub fn extract_all_parallel<P, Q>(
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

    let sink = DirectorySink::from_options(output.as_ref(), options)?;
    log::debug!(
        "Extracting {} video(s) on {} thread(s)",
        videos.len(),
        ::rayon::current_num_threads()
    );

    let reports = extract_paths_parallel(
        &videos,
        |path: &Path| FfmpegSource::open(path),
        &sink,
        options,
    )?;

    Ok(ExtractionReport {
        output: sink.directory().to_path_buf(),
        videos: reports,
    })
}
