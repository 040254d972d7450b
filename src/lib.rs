//! # videotoframes
//!
//! Extract still frames from video files, either every frame or a capped
//! number of them. A capped extraction takes the first N frames or, with
//! even sampling, N frames spread uniformly over the whole video with the
//! first and last frame always included.
//!
//! Decoding is done by FFmpeg through the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate and frames are
//! encoded with [`image`].
//!
//! ## Quick Start
//!
//! ### Extract every frame of every video in a directory
//!
//! ```no_run
//! use videotoframes::ExtractOptions;
//!
//! let report = videotoframes::extract_all("videos/", "frames/", &ExtractOptions::new())?;
//! println!("wrote {} frames", report.total_frames());
//! # Ok::<(), videotoframes::ExtractError>(())
//! ```
//!
//! ### Sample ten evenly spaced frames
//!
//! ```no_run
//! use videotoframes::{ExtractOptions, FrameSelection};
//!
//! let options = ExtractOptions::new().with_selection(FrameSelection::Even(10));
//! videotoframes::extract_all("small.mp4", "frames/", &options)?;
//! // frames/small-frame000.jpg ... frames/small-frame165.jpg
//! # Ok::<(), videotoframes::ExtractError>(())
//! ```
//!
//! ### Use the selector on its own
//!
//! ```
//! let indices = videotoframes::select_frames(11, Some(4))?;
//! assert_eq!(indices.into_iter().collect::<Vec<_>>(), vec![0, 3, 7, 10]);
//! # Ok::<(), videotoframes::ExtractError>(())
//! ```
//!
//! ## Architecture
//!
//! The selector ([`select_frames`], [`FrameSelection`]) is pure. Decoding
//! sits behind [`VideoSource`] ([`FfmpegSource`]) and writing behind
//! [`ImageSink`] ([`DirectorySink`]), and [`extract_video`] connects the
//! two, so every stage can be exercised without real video files.
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | `extract_all_parallel()` processes several videos at once |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod config;
pub mod decoder;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod metadata;
pub mod progress;
#[cfg(feature = "rayon")]
mod rayon;
pub mod selection;
pub mod sink;
pub mod source;

pub use config::{DEFAULT_JPEG_QUALITY, ExtractOptions, ImageFormat};
pub use decoder::FfmpegSource;
pub use discovery::{VIDEO_EXTENSIONS, find_videos, has_video_extension, video_stem};
pub use error::ExtractError;
pub use extract::{ExtractionReport, VideoReport, extract_all, extract_paths, extract_video};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::VideoInfo;
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
#[cfg(feature = "rayon")]
pub use self::rayon::{extract_all_parallel, extract_paths_parallel};
pub use selection::{FrameSelection, select_frames};
pub use sink::{DirectorySink, ImageSink, frame_file_name};
pub use source::VideoSource;
