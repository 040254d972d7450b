//! The Image Sink abstraction.
//!
//! [`ImageSink`] receives every selected frame. [`DirectorySink`] writes
//! them as image files into one flat output directory, named
//! `<stem>-frame<NNN>.<ext>` so frames from several videos can share it.

use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use image::{DynamicImage, codecs::jpeg::JpegEncoder};

use crate::{
    config::{DEFAULT_JPEG_QUALITY, ExtractOptions, ImageFormat},
    error::ExtractError,
};

/// Destination for extracted frames.
pub trait ImageSink {
    /// Store frame `index` of the video named `stem` and return where it went.
    fn write_frame(
        &mut self,
        stem: &str,
        index: u64,
        image: &DynamicImage,
    ) -> Result<PathBuf, ExtractError>;
}

impl<S: ImageSink + ?Sized> ImageSink for &mut S {
    fn write_frame(
        &mut self,
        stem: &str,
        index: u64,
        image: &DynamicImage,
    ) -> Result<PathBuf, ExtractError> {
        (**self).write_frame(stem, index, image)
    }
}

/// File name for frame `index` of the video named `stem`.
///
/// The index is zero-padded to three digits; longer indices keep all their
/// digits.
///
/// ```
/// assert_eq!(videotoframes::frame_file_name("clip", 7, "jpg"), "clip-frame007.jpg");
/// assert_eq!(videotoframes::frame_file_name("clip", 1234, "png"), "clip-frame1234.png");
/// ```
pub fn frame_file_name(stem: &str, index: u64, extension: &str) -> String {
    format!("{stem}-frame{index:03}.{extension}")
}

/// Writes frames as image files into a single directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
    format: ImageFormat,
    jpeg_quality: u8,
    overwrite: bool,
}

impl DirectorySink {
    /// Create a sink writing into `directory`, creating it (and any missing
    /// parents) if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::IoError`] if the directory cannot be created.
    pub fn create<P: AsRef<Path>>(
        directory: P,
        format: ImageFormat,
        overwrite: bool,
    ) -> Result<Self, ExtractError> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory)?;
        log::debug!("Writing frames to {}", directory.display());
        Ok(Self {
            directory,
            format,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            overwrite,
        })
    }

    /// Create a sink configured from extraction options.
    pub fn from_options<P: AsRef<Path>>(
        directory: P,
        options: &ExtractOptions,
    ) -> Result<Self, ExtractError> {
        Ok(Self::create(directory, options.image_format, options.overwrite)?
            .with_jpeg_quality(options.jpeg_quality))
    }

    /// Set the JPEG quality, clamped to `1..=100`.
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// The directory frames are written into.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Where frame `index` of `stem` would be written.
    pub fn frame_path(&self, stem: &str, index: u64) -> PathBuf {
        self.directory
            .join(frame_file_name(stem, index, self.format.extension()))
    }
}

impl ImageSink for DirectorySink {
    fn write_frame(
        &mut self,
        stem: &str,
        index: u64,
        image: &DynamicImage,
    ) -> Result<PathBuf, ExtractError> {
        let path = self.frame_path(stem, index);
        if !self.overwrite && path.exists() {
            return Err(ExtractError::OutputExists(path));
        }

        match self.format {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel.
                let rgb = image.to_rgb8();
                let writer = BufWriter::new(File::create(&path)?);
                let encoder = JpegEncoder::new_with_quality(writer, self.jpeg_quality);
                rgb.write_with_encoder(encoder)?;
            }
            other => image.save_with_format(&path, other.to_encoder_format())?,
        }

        log::debug!("Wrote frame {index} of {stem} to {}", path.display());
        Ok(path)
    }
}
