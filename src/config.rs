//! Extraction options.
//!
//! [`ExtractOptions`] is a builder that carries the frame selection policy,
//! the output image format, and the operational settings (progress,
//! cancellation, overwrite policy) through the extraction functions.
//!
//! # Example
//!
//! ```no_run
//! use videotoframes::{CancellationToken, ExtractOptions, FrameSelection, ImageFormat};
//!
//! let token = CancellationToken::new();
//! let options = ExtractOptions::new()
//!     .with_selection(FrameSelection::Even(10))
//!     .with_image_format(ImageFormat::Png)
//!     .with_cancellation(token.clone());
//! ```

use std::{
    fmt::{self, Debug, Formatter},
    str::FromStr,
    sync::Arc,
};

use image::ImageFormat as EncoderFormat;

use crate::{
    error::ExtractError,
    progress::{CancellationToken, NoOpProgress, ProgressCallback},
    selection::FrameSelection,
};

/// Default JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Image format for written frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// JPEG, extension `jpg`. This is the default.
    #[default]
    Jpeg,
    /// PNG, extension `png`.
    Png,
    /// BMP, extension `bmp`.
    Bmp,
    /// TIFF, extension `tiff`.
    Tiff,
}

impl ImageFormat {
    /// File extension used for frames written in this format.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
        }
    }

    pub(crate) fn to_encoder_format(self) -> EncoderFormat {
        match self {
            ImageFormat::Jpeg => EncoderFormat::Jpeg,
            ImageFormat::Png => EncoderFormat::Png,
            ImageFormat::Bmp => EncoderFormat::Bmp,
            ImageFormat::Tiff => EncoderFormat::Tiff,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ExtractError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            "bmp" => Ok(ImageFormat::Bmp),
            "tif" | "tiff" => Ok(ImageFormat::Tiff),
            _ => Err(ExtractError::InvalidArgument(format!(
                "unsupported image format: {value}"
            ))),
        }
    }
}

/// Settings for an extraction run.
///
/// A default-constructed value writes every frame as JPEG at quality
/// [`DEFAULT_JPEG_QUALITY`], replacing existing files, with no progress
/// reporting and no cancellation.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) selection: FrameSelection,
    pub(crate) image_format: ImageFormat,
    pub(crate) jpeg_quality: u8,
    pub(crate) overwrite: bool,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    /// Fire the progress callback every N written frames.
    pub(crate) batch_size: u64,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("selection", &self.selection)
            .field("image_format", &self.image_format)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("overwrite", &self.overwrite)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            selection: FrameSelection::All,
            image_format: ImageFormat::Jpeg,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            overwrite: true,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Choose which frames of each video are written.
    #[must_use]
    pub fn with_selection(mut self, selection: FrameSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Set the output image format.
    #[must_use]
    pub fn with_image_format(mut self, format: ImageFormat) -> Self {
        self.image_format = format;
        self
    }

    /// Set the JPEG quality, clamped to `1..=100`. Ignored for other formats.
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Control whether existing frame files are replaced. Defaults to `true`.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token, checked before each decoded frame.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The configured frame selection policy.
    pub fn selection(&self) -> FrameSelection {
        self.selection
    }

    /// The configured output image format.
    pub fn image_format(&self) -> ImageFormat {
        self.image_format
    }

    /// The configured JPEG quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
