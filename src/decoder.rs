//! FFmpeg-backed [`VideoSource`].
//!
//! [`FfmpegSource`] opens a container, picks its best video stream and
//! decodes frames sequentially. Frames are numbered in decode output order,
//! starting at zero, so index `n` is always the `n`-th picture the decoder
//! produced regardless of the stream's timestamps.

use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    error::EAGAIN,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{error::ExtractError, metadata::VideoInfo, source::VideoSource};

/// Back-to-back packet read failures after which a video is abandoned.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 8;

/// Tracks consecutive demuxer read failures so a damaged file cannot keep
/// the decode loop spinning.
#[derive(Debug, Default)]
struct ReadErrors {
    consecutive: u32,
}

impl ReadErrors {
    fn clear(&mut self) {
        self.consecutive = 0;
    }

    /// Record a failed read. Isolated failures are skipped with a warning;
    /// the [`MAX_CONSECUTIVE_READ_ERRORS`]th in a row is returned as an error.
    fn record(&mut self, error: impl Display, path: &Path) -> Result<(), ExtractError> {
        self.consecutive += 1;
        if self.consecutive >= MAX_CONSECUTIVE_READ_ERRORS {
            return Err(ExtractError::VideoDecodeError(format!(
                "{} unreadable packets in a row in {}: {error}",
                self.consecutive,
                path.display()
            )));
        }
        log::warn!("Skipping unreadable packet in {}: {error}", path.display());
        Ok(())
    }
}

/// Sequential frame decoder for one video file.
///
/// # Example
///
/// ```no_run
/// use videotoframes::{FfmpegSource, VideoSource};
///
/// let mut source = FfmpegSource::open("input.mp4")?;
/// let total = source.frame_count()?;
/// while let Some(index) = source.next_frame()? {
///     if index == total - 1 {
///         source.current_image()?.save("last.png")?;
///     }
/// }
/// # Ok::<(), videotoframes::ExtractError>(())
/// ```
pub struct FfmpegSource {
    path: PathBuf,
    input_context: Input,
    decoder: VideoDecoder,
    scaler: Option<ScalingContext>,
    video_stream_index: usize,
    info: VideoInfo,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    /// Index the next decoded frame will receive.
    next_index: u64,
    has_frame: bool,
    eof_sent: bool,
    read_errors: ReadErrors,
    frame_count: Option<u64>,
}

impl Debug for FfmpegSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FfmpegSource")
            .field("path", &self.path)
            .field("video_stream_index", &self.video_stream_index)
            .field("info", &self.info)
            .field("next_index", &self.next_index)
            .finish_non_exhaustive()
    }
}

impl FfmpegSource {
    /// Open a video file for sequential decoding.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::FileOpen`] if the file cannot be opened or its
    ///   codec parameters cannot be read.
    /// - [`ExtractError::NoVideoStream`] if the file has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video file: {}", path.display());

        crate::ffmpeg::init().map_err(|error| ExtractError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context = open_input(&path)?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(ExtractError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            0.0
        };
        let declared_frame_count = u64::try_from(stream.frames()).ok().filter(|&n| n > 0);

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| ExtractError::FileOpen {
                path: path.clone(),
                reason: format!(
                    "Failed to create video decoder for stream {video_stream_index}: {error}"
                ),
            })?;

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let info = VideoInfo {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            declared_frame_count,
            codec,
        };

        log::info!(
            "Opened {}: {}x{} @ {:.2} fps, codec={}, declared frames={}",
            path.display(),
            info.width,
            info.height,
            info.frames_per_second,
            info.codec,
            info.declared_frame_count
                .map_or_else(|| "unknown".to_string(), |n| n.to_string()),
        );

        Ok(Self {
            path,
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            info,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            next_index: 0,
            has_frame: false,
            eof_sent: false,
            read_errors: ReadErrors::default(),
            frame_count: None,
        })
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count the video packets with a demux-only pass, then reopen the file
    /// so decoding starts from the beginning.
    fn count_packets(&mut self) -> Result<u64, ExtractError> {
        let mut count = 0_u64;
        for (stream, _packet) in self.input_context.packets() {
            if stream.index() == self.video_stream_index {
                count += 1;
            }
        }
        self.input_context = open_input(&self.path)?;
        Ok(count)
    }
}

impl VideoSource for FfmpegSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn frame_count(&mut self) -> Result<u64, ExtractError> {
        if let Some(count) = self.frame_count {
            return Ok(count);
        }
        if self.next_index > 0 {
            return Err(ExtractError::InvalidArgument(
                "frame count must be requested before decoding starts".to_string(),
            ));
        }

        let count = match self.info.declared_frame_count {
            Some(declared) => declared,
            None => {
                log::debug!(
                    "{} does not declare a frame count; counting packets",
                    self.path.display()
                );
                self.count_packets()?
            }
        };
        self.frame_count = Some(count);
        Ok(count)
    }

    fn next_frame(&mut self) -> Result<Option<u64>, ExtractError> {
        loop {
            match self.decoder.receive_frame(&mut self.decoded_frame) {
                Ok(()) => {
                    let index = self.next_index;
                    self.next_index += 1;
                    self.has_frame = true;
                    return Ok(Some(index));
                }
                Err(FfmpegError::Eof) => return Ok(None),
                Err(FfmpegError::Other { errno }) if errno == EAGAIN => {}
                Err(error) => {
                    return Err(ExtractError::VideoDecodeError(format!(
                        "frame {} of {}: {error}",
                        self.next_index,
                        self.path.display()
                    )));
                }
            }

            if self.eof_sent {
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    self.read_errors.clear();
                    if packet.stream() == self.video_stream_index {
                        self.decoder.send_packet(&packet).map_err(|error| {
                            ExtractError::VideoDecodeError(format!(
                                "frame {} of {}: {error}",
                                self.next_index,
                                self.path.display()
                            ))
                        })?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => self.read_errors.record(error, &self.path)?,
            }
        }
    }

    fn current_image(&mut self) -> Result<DynamicImage, ExtractError> {
        if !self.has_frame {
            return Err(ExtractError::VideoDecodeError(
                "no frame has been decoded yet".to_string(),
            ));
        }

        let width = self.decoded_frame.width();
        let height = self.decoded_frame.height();

        // Streams may change resolution mid-way; rebuild the scaler when the
        // decoded frame no longer matches it.
        let stale = self.scaler.as_ref().is_none_or(|scaler| {
            let input = scaler.input();
            input.width != width || input.height != height || input.format != self.decoded_frame.format()
        });
        if stale {
            self.scaler = Some(ScalingContext::get(
                self.decoded_frame.format(),
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?);
        }

        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;
        }

        let buffer = frame_to_buffer(&self.rgb_frame, width, height, 3);
        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            ExtractError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }
}

fn open_input(path: &Path) -> Result<Input, ExtractError> {
    ffmpeg_next::format::input(&path).map_err(|error| ExtractError::FileOpen {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}

/// Copy the first plane of a packed frame into a tightly packed buffer,
/// dropping FFmpeg's per-row padding.
fn frame_to_buffer(frame: &VideoFrame, width: u32, height: u32, bytes_per_pixel: usize) -> Vec<u8> {
    let stride = frame.stride(0);
    let row_length = (width as usize) * bytes_per_pixel;
    let data = frame.data(0);

    if stride == row_length {
        data[..row_length * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_length * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_length]);
        }
        buffer
    }
}
