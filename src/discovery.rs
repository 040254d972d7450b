//! Input resolution.
//!
//! [`find_videos`] turns the user's input path into the ordered list of
//! video files to process.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::error::ExtractError;

/// Extensions (lower case, without the dot) recognised as video files when
/// scanning a directory.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "mkv", "webm", "avi", "wmv", "flv", "mpg", "mpeg", "ts", "m2ts",
    "3gp", "ogv",
];

/// Whether `path` has one of the [`VIDEO_EXTENSIONS`], ignoring case.
pub fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}

/// Resolve `input` into the video files to extract from.
///
/// A file is returned as-is whatever its extension. A directory yields the
/// files directly inside it that have a video extension; subdirectories are
/// not searched. The result is sorted so processing order does not depend on
/// the filesystem's listing order. An empty result is not an error here.
///
/// # Errors
///
/// Returns [`ExtractError::IoError`] if `input` does not exist or the
/// directory cannot be read.
pub fn find_videos<P: AsRef<Path>>(input: P) -> Result<Vec<PathBuf>, ExtractError> {
    let input = input.as_ref();
    let metadata = fs::metadata(input).map_err(|error| {
        io::Error::new(
            error.kind(),
            format!("cannot read input {}: {error}", input.display()),
        )
    })?;

    if metadata.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut videos = Vec::new();
    for entry in fs::read_dir(input)? {
        let path = entry?.path();
        if path.is_file() && has_video_extension(&path) {
            videos.push(path);
        }
    }
    videos.sort();

    log::debug!("Found {} video(s) in {}", videos.len(), input.display());
    Ok(videos)
}

/// The file name of `path` without its extension, used to prefix frame
/// files.
pub fn video_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string())
}
