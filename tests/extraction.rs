//! End-to-end extraction tests over a synthetic video source.
//!
//! Frames are written for real into temporary directories; only decoding is
//! simulated.

mod support;

use std::{fs, path::PathBuf};

use support::{SyntheticSource, file_names, synthetic_opener};
use videotoframes::{
    DirectorySink, ExtractError, ExtractOptions, FrameSelection, ImageFormat, extract_paths,
    extract_video, frame_file_name,
};

fn jpeg_sink(directory: &std::path::Path) -> DirectorySink {
    DirectorySink::create(directory, ImageFormat::Jpeg, true).expect("Failed to create sink")
}

// ── single video ───────────────────────────────────────────────────

#[test]
fn all_frames_are_written() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");
    let mut sink = jpeg_sink(&output);
    let mut source = SyntheticSource::new(166);

    let report = extract_video(&mut source, "small", &mut sink, &ExtractOptions::new())
        .expect("Extraction failed");

    assert_eq!(report.frames.len(), 166);
    assert_eq!(file_names(&output).len(), 166);
    assert!(output.join("small-frame000.jpg").exists());
    assert!(output.join("small-frame165.jpg").exists());
}

#[test]
fn max_frames_takes_first_frames() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");
    let mut sink = jpeg_sink(&output);
    let mut source = SyntheticSource::new(166);
    let options = ExtractOptions::new().with_selection(FrameSelection::from_limits(Some(10), false));

    extract_video(&mut source, "small", &mut sink, &options).expect("Extraction failed");

    let expected: Vec<String> = (0..10)
        .map(|index| frame_file_name("small", index, "jpg"))
        .collect();
    assert_eq!(file_names(&output), expected);
}

#[test]
fn max_frames_stops_decoding_early() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut sink = jpeg_sink(temporary_directory.path());
    let mut source = SyntheticSource::new(166);
    let options = ExtractOptions::new().with_selection(FrameSelection::First(10));

    extract_video(&mut source, "small", &mut sink, &options).expect("Extraction failed");

    assert_eq!(source.decoded, 10);
    assert_eq!(source.converted, 10);
}

#[test]
fn even_selection_spans_whole_video() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");
    let mut sink = jpeg_sink(&output);
    let mut source = SyntheticSource::new(166);
    let options = ExtractOptions::new().with_selection(FrameSelection::from_limits(Some(10), true));

    let report = extract_video(&mut source, "small", &mut sink, &options).expect("Extraction failed");

    let names = file_names(&output);
    assert_eq!(names.len(), 10);
    assert!(names.contains(&"small-frame000.jpg".to_string()));
    assert!(names.contains(&"small-frame165.jpg".to_string()));
    assert_eq!(report.frame_count, Some(166));
}

#[test]
fn even_selection_of_two_frames() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");
    let mut sink = jpeg_sink(&output);
    let mut source = SyntheticSource::new(166);
    let options = ExtractOptions::new().with_selection(FrameSelection::Even(2));

    extract_video(&mut source, "small", &mut sink, &options).expect("Extraction failed");

    assert_eq!(
        file_names(&output),
        vec!["small-frame000.jpg".to_string(), "small-frame165.jpg".to_string()]
    );
    // Unselected frames are decoded but never converted.
    assert_eq!(source.converted, 2);
}

#[test]
fn even_selection_on_empty_video_writes_nothing() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut sink = jpeg_sink(temporary_directory.path());
    let mut source = SyntheticSource::new(0);
    let options = ExtractOptions::new().with_selection(FrameSelection::Even(5));

    let report = extract_video(&mut source, "empty", &mut sink, &options).expect("Extraction failed");

    assert!(report.frames.is_empty());
    assert!(file_names(temporary_directory.path()).is_empty());
}

#[test]
fn frame_indices_above_999_keep_all_digits() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut sink = jpeg_sink(temporary_directory.path());
    let mut source = SyntheticSource::with_size(1001, 4, 4);
    let options = ExtractOptions::new().with_selection(FrameSelection::Even(2));

    extract_video(&mut source, "long", &mut sink, &options).expect("Extraction failed");

    assert_eq!(
        file_names(temporary_directory.path()),
        vec!["long-frame000.jpg".to_string(), "long-frame1000.jpg".to_string()]
    );
}

#[test]
fn written_jpeg_keeps_source_dimensions() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut sink = jpeg_sink(temporary_directory.path());
    let mut source = SyntheticSource::with_size(3, 560, 320);
    let options = ExtractOptions::new().with_selection(FrameSelection::First(1));

    let report = extract_video(&mut source, "small", &mut sink, &options).expect("Extraction failed");

    let (_, path) = &report.frames[0];
    let image = image::open(path).expect("Failed to read written frame");
    assert_eq!((image.width(), image.height()), (560, 320));
    assert_eq!(image.color(), image::ColorType::Rgb8);
}

#[test]
fn png_format_uses_png_extension() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new()
        .with_image_format(ImageFormat::Png)
        .with_selection(FrameSelection::First(2));
    let mut sink =
        DirectorySink::from_options(temporary_directory.path(), &options).expect("Failed to create sink");
    let mut source = SyntheticSource::new(5);

    extract_video(&mut source, "clip", &mut sink, &options).expect("Extraction failed");

    assert_eq!(
        file_names(temporary_directory.path()),
        vec!["clip-frame000.png".to_string(), "clip-frame001.png".to_string()]
    );
    let decoded = image::open(temporary_directory.path().join("clip-frame001.png"))
        .expect("Failed to read png")
        .to_rgb8();
    assert_eq!(decoded.get_pixel(0, 0).0, [1, 128, 254]);
}

// ── failures ───────────────────────────────────────────────────────

#[test]
fn decode_failure_aborts_the_video() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut sink = jpeg_sink(temporary_directory.path());
    let mut source = SyntheticSource::new(20).failing_at(5);

    let result = extract_video(&mut source, "broken", &mut sink, &ExtractOptions::new());

    match result {
        Err(ExtractError::VideoDecodeError(message)) => assert!(message.contains("5")),
        other => panic!("Expected VideoDecodeError, got: {other:?}"),
    }
    assert_eq!(file_names(temporary_directory.path()).len(), 5);
}

#[test]
fn zero_limit_is_rejected_before_decoding() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut sink = jpeg_sink(temporary_directory.path());
    let mut source = SyntheticSource::new(20);
    let options = ExtractOptions::new().with_selection(FrameSelection::First(0));

    let result = extract_video(&mut source, "clip", &mut sink, &options);

    assert!(matches!(result, Err(ExtractError::InvalidArgument(_))));
    assert_eq!(source.decoded, 0);
}

#[test]
fn no_overwrite_refuses_existing_frame() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(temporary_directory.path().join("clip-frame000.jpg"), b"old")
        .expect("Failed to write placeholder");
    let mut sink = DirectorySink::create(temporary_directory.path(), ImageFormat::Jpeg, false)
        .expect("Failed to create sink");
    let mut source = SyntheticSource::new(3);

    let result = extract_video(&mut source, "clip", &mut sink, &ExtractOptions::new());

    match result {
        Err(ExtractError::OutputExists(path)) => {
            assert_eq!(path, temporary_directory.path().join("clip-frame000.jpg"));
        }
        other => panic!("Expected OutputExists, got: {other:?}"),
    }
}

#[test]
fn overwrite_replaces_existing_frame() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let existing = temporary_directory.path().join("clip-frame000.jpg");
    fs::write(&existing, b"old").expect("Failed to write placeholder");
    let mut sink = jpeg_sink(temporary_directory.path());
    let mut source = SyntheticSource::new(1);

    extract_video(&mut source, "clip", &mut sink, &ExtractOptions::new()).expect("Extraction failed");

    assert!(image::open(&existing).is_ok());
}

// ── several videos ─────────────────────────────────────────────────

#[test]
fn two_videos_write_the_sum_of_their_frames() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");
    let mut sink = jpeg_sink(&output);
    let videos = vec![PathBuf::from("in/small.mp4"), PathBuf::from("in/small2.mp4")];

    let reports = extract_paths(&videos, synthetic_opener(166), &mut sink, &ExtractOptions::new())
        .expect("Extraction failed");

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].stem, "small");
    assert_eq!(reports[1].stem, "small2");
    assert_eq!(reports[1].source.as_deref(), Some(videos[1].as_path()));
    assert_eq!(file_names(&output).len(), 332);
}

#[test]
fn open_failure_stops_the_run() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut sink = jpeg_sink(temporary_directory.path());
    let videos = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")];

    let result = extract_paths(
        &videos,
        |path: &std::path::Path| {
            if path.ends_with("b.mp4") {
                Err(ExtractError::NoVideoStream)
            } else {
                Ok(SyntheticSource::new(2))
            }
        },
        &mut sink,
        &ExtractOptions::new(),
    );

    assert!(matches!(result, Err(ExtractError::NoVideoStream)));
    assert_eq!(file_names(temporary_directory.path()).len(), 2);
}
