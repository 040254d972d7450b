//! Error types for the `videotoframes` crate.
//!
//! This module defines [`ExtractError`], the unified error type returned by
//! every fallible operation in the crate. Variants carry the file paths and
//! upstream messages needed to diagnose a failure without extra logging.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `videotoframes` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// A caller-supplied value is outside its valid domain (for example a
    /// zero frame count or a zero frame limit).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The input path resolved to no video files.
    #[error("No video selected.")]
    NoVideoSelected,

    /// The video file could not be opened or its streams could not be read.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::FfmpegSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded or converted.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// The sink refused to replace an existing frame file.
    #[error("Output file already exists: {0}")]
    OutputExists(PathBuf),

    /// An I/O error occurred while scanning the input or writing images.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for ExtractError {
    fn from(error: FfmpegError) -> Self {
        ExtractError::FfmpegError(error.to_string())
    }
}
