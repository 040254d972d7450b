//! Video stream metadata.
//!
//! [`VideoInfo`] is read once when a source is opened and describes the
//! stream that frames are decoded from.

/// Metadata for the decoded video stream.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frames per second; `0.0` when the container does not say.
    pub frames_per_second: f64,
    /// Frame count declared by the container, if any.
    ///
    /// This is a hint. [`VideoSource::frame_count`](crate::VideoSource::frame_count)
    /// returns the exact number.
    pub declared_frame_count: Option<u64>,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
}
