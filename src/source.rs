//! The Video Source abstraction.
//!
//! [`VideoSource`] is the narrow interface the extractor pulls frames
//! through. [`FfmpegSource`](crate::FfmpegSource) implements it over FFmpeg;
//! tests implement it over synthetic images.
//!
//! The interface is pull-based: [`next_frame`](VideoSource::next_frame)
//! decodes one frame and reports its index, and only frames the extractor
//! keeps are converted to an image with
//! [`current_image`](VideoSource::current_image).

use image::DynamicImage;

use crate::{error::ExtractError, metadata::VideoInfo};

/// A sequential reader of decoded video frames.
pub trait VideoSource {
    /// Metadata of the stream being decoded.
    fn info(&self) -> &VideoInfo;

    /// Exact number of decodable frames.
    ///
    /// Must be called before the first [`next_frame`](VideoSource::next_frame);
    /// implementations may rewind the stream to compute it.
    fn frame_count(&mut self) -> Result<u64, ExtractError>;

    /// Decode the next frame and return its zero-based index, or `None` once
    /// the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<u64>, ExtractError>;

    /// Convert the most recently decoded frame to an image.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::VideoDecodeError`] if no frame has been
    /// decoded yet or conversion fails.
    fn current_image(&mut self) -> Result<DynamicImage, ExtractError>;
}

impl<S: VideoSource + ?Sized> VideoSource for Box<S> {
    fn info(&self) -> &VideoInfo {
        (**self).info()
    }

    fn frame_count(&mut self) -> Result<u64, ExtractError> {
        (**self).frame_count()
    }

    fn next_frame(&mut self) -> Result<Option<u64>, ExtractError> {
        (**self).next_frame()
    }

    fn current_image(&mut self) -> Result<DynamicImage, ExtractError> {
        (**self).current_image()
    }
}
