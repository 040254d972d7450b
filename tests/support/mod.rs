//! Synthetic video source shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;

use ffmpeg_next::{
    Packet, Rational,
    codec::{self, context::Context as CodecContext},
    format::{self, Pixel},
    frame::Video as VideoFrame,
};
use image::{DynamicImage, Rgb, RgbImage};
use videotoframes::{ExtractError, VideoInfo, VideoSource};

/// Frame rate of clips written by [`encode_clip`].
pub const CLIP_FPS: i32 = 25;

/// A video of `frame_count` solid-colour frames.
pub struct SyntheticSource {
    info: VideoInfo,
    frame_count: u64,
    next_index: u64,
    current: Option<u64>,
    fail_at: Option<u64>,
    /// Frames handed out by `next_frame`.
    pub decoded: u64,
    /// Frames converted by `current_image`.
    pub converted: u64,
}

impl SyntheticSource {
    pub fn new(frame_count: u64) -> Self {
        Self::with_size(frame_count, 56, 32)
    }

    pub fn with_size(frame_count: u64, width: u32, height: u32) -> Self {
        Self {
            info: VideoInfo {
                width,
                height,
                frames_per_second: 25.0,
                declared_frame_count: Some(frame_count),
                codec: "synthetic".to_string(),
            },
            frame_count,
            next_index: 0,
            current: None,
            fail_at: None,
            decoded: 0,
            converted: 0,
        }
    }

    /// Make decoding fail when frame `index` is reached.
    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Pretend the container does not declare a frame count.
    pub fn without_declared_count(mut self) -> Self {
        self.info.declared_frame_count = None;
        self
    }
}

impl VideoSource for SyntheticSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn frame_count(&mut self) -> Result<u64, ExtractError> {
        Ok(self.frame_count)
    }

    fn next_frame(&mut self) -> Result<Option<u64>, ExtractError> {
        if self.next_index >= self.frame_count {
            return Ok(None);
        }
        if self.fail_at == Some(self.next_index) {
            return Err(ExtractError::VideoDecodeError(format!(
                "corrupt frame {}",
                self.next_index
            )));
        }
        let index = self.next_index;
        self.next_index += 1;
        self.current = Some(index);
        self.decoded += 1;
        Ok(Some(index))
    }

    fn current_image(&mut self) -> Result<DynamicImage, ExtractError> {
        let index = self.current.ok_or_else(|| {
            ExtractError::VideoDecodeError("no frame has been decoded yet".to_string())
        })?;
        self.converted += 1;
        let shade = (index % 256) as u8;
        let image = RgbImage::from_pixel(self.info.width, self.info.height, Rgb([shade, 128, 255 - shade]));
        Ok(DynamicImage::ImageRgb8(image))
    }
}

/// Open function for `extract_paths` that gives every file `frame_count`
/// synthetic frames.
pub fn synthetic_opener(
    frame_count: u64,
) -> impl FnMut(&Path) -> Result<SyntheticSource, ExtractError> {
    move |_path: &Path| Ok(SyntheticSource::new(frame_count))
}

/// Sorted file names in `directory`.
pub fn file_names(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(directory)
        .expect("Failed to read output directory")
        .map(|entry| {
            entry
                .expect("Failed to read directory entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// Encode a short MPEG-4 clip of flat grey frames, each a little brighter
/// than the one before. The container follows the file extension.
pub fn encode_clip(
    path: &Path,
    frame_count: u64,
    width: u32,
    height: u32,
) -> Result<(), ffmpeg_next::Error> {
    ffmpeg_next::init()?;
    let time_base = Rational::new(1, CLIP_FPS);

    let mut output = format::output(path)?;
    let global_header = output
        .format()
        .flags()
        .contains(format::Flags::GLOBAL_HEADER);
    let mpeg4 = ffmpeg_next::encoder::find(codec::Id::MPEG4)
        .ok_or(ffmpeg_next::Error::EncoderNotFound)?;

    let mut stream = output.add_stream(mpeg4)?;
    let stream_index = stream.index();

    let mut encoder = CodecContext::from_parameters(stream.parameters())?
        .encoder()
        .video()?;
    encoder.set_width(width);
    encoder.set_height(height);
    encoder.set_format(Pixel::YUV420P);
    encoder.set_time_base(time_base);
    encoder.set_frame_rate(Some(Rational::new(CLIP_FPS, 1)));
    if global_header {
        encoder.set_flags(codec::Flags::GLOBAL_HEADER);
    }
    let mut encoder = encoder.open_as(mpeg4)?;
    stream.set_parameters(&encoder);
    stream.set_time_base(time_base);

    output.write_header()?;
    let stream_time_base = output
        .stream(stream_index)
        .map(|stream| stream.time_base())
        .unwrap_or(time_base);

    for index in (0..frame_count).map(Some).chain([None]) {
        match index {
            Some(index) => encoder.send_frame(&grey_frame(index, width, height))?,
            None => encoder.send_eof()?,
        }
        let mut packet = Packet::empty();
        while encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(stream_index);
            packet.rescale_ts(time_base, stream_time_base);
            packet.write_interleaved(&mut output)?;
        }
    }

    output.write_trailer()
}

fn grey_frame(index: u64, width: u32, height: u32) -> VideoFrame {
    let mut frame = VideoFrame::new(Pixel::YUV420P, width, height);
    let luma = 16 + (index * 8 % 220) as u8;
    for (plane, value) in [(0, luma), (1, 128), (2, 128)] {
        let (columns, rows) = if plane == 0 {
            (width as usize, height as usize)
        } else {
            (width as usize / 2, height as usize / 2)
        };
        let stride = frame.stride(plane);
        let data = frame.data_mut(plane);
        for row in 0..rows {
            data[row * stride..row * stride + columns].fill(value);
        }
    }
    frame.set_pts(Some(index as i64));
    frame
}
