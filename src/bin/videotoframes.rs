use std::{io, path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use videotoframes::{
    DEFAULT_JPEG_QUALITY, ExtractOptions, ExtractionReport, FfmpegLogLevel, FrameSelection,
    ImageFormat, ProgressCallback, ProgressInfo,
};

const CLI_AFTER_HELP: &str = "Examples:\n  videotoframes -i small.mp4 -o frames\n  videotoframes -i videos/ -o frames --max-frames 10 --even\n  videotoframes -i small.mp4 -o frames --max-frames 5 --format png --json\n  videotoframes --completions zsh > _videotoframes";

#[derive(Debug, Parser)]
#[command(
    name = "videotoframes",
    version,
    about = "Extract still frames from video files",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Directory the frames are written into; created if missing.
    #[arg(short, long, required = true)]
    output: Option<PathBuf>,

    /// Video file, or a directory whose videos are all processed (not recursive).
    #[arg(short, long, required = true)]
    input: Option<PathBuf>,

    /// Write at most this many frames per video.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_frames: Option<u64>,

    /// With --max-frames, spread the frames evenly over the whole video
    /// instead of taking the first ones.
    #[arg(long)]
    even: bool,

    /// Image format for the frames (jpg, png, bmp, tiff).
    #[arg(long, default_value = "jpg", value_parser = parse_image_format)]
    format: ImageFormat,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Fail instead of replacing frame files that already exist.
    #[arg(long)]
    no_overwrite: bool,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Show debug logging.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, default_value = "error", value_parser = parse_log_level)]
    log_level: FfmpegLogLevel,

    /// Print a machine-readable summary as JSON.
    #[arg(long)]
    json: bool,

    /// Process several videos at once (requires the `rayon` feature).
    #[arg(long)]
    parallel: bool,

    /// Print shell completions and exit.
    #[arg(long, value_enum, exclusive = true)]
    completions: Option<Shell>,
}

fn parse_image_format(value: &str) -> Result<ImageFormat, String> {
    value.parse().map_err(|error: videotoframes::ExtractError| error.to_string())
}

fn parse_log_level(value: &str) -> Result<FfmpegLogLevel, String> {
    value.parse().map_err(|error: videotoframes::ExtractError| error.to_string())
}

impl Cli {
    fn extract_options(&self) -> ExtractOptions {
        let mut options = ExtractOptions::new()
            .with_selection(FrameSelection::from_limits(self.max_frames, self.even))
            .with_image_format(self.format)
            .with_jpeg_quality(self.quality)
            .with_overwrite(!self.no_overwrite);

        if self.progress {
            options = options.with_progress(Arc::new(TerminalProgress::new()));
        }

        options
    }
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        Self { bar }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.frames_expected {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.frames_written);
        self.bar.set_message(info.stem.clone());
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn print_report(report: &ExtractionReport, as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if as_json {
        let payload = json!({
            "output": report.output,
            "total_frames": report.total_frames(),
            "videos": report.videos.iter().map(|video| json!({
                "source": video.source,
                "stem": video.stem,
                "frame_count": video.frame_count,
                "frames": video.frames.iter().map(|(index, path)| json!({
                    "index": index,
                    "path": path,
                })).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for video in &report.videos {
            println!("{} {} frame(s)", video.stem.bold(), video.frames.len());
        }
        println!(
            "{} {}",
            "success:".green().bold(),
            format!(
                "Extracted {} frame(s) from {} video(s) to {}",
                report.total_frames(),
                report.videos.len(),
                report.output.display()
            )
            .green()
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "videotoframes", &mut io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose);
    videotoframes::set_ffmpeg_log_level(cli.log_level);

    let options = cli.extract_options();
    let (Some(input), Some(output)) = (&cli.input, &cli.output) else {
        return Err("--input and --output are required".into());
    };

    #[cfg(feature = "rayon")]
    let report = if cli.parallel {
        videotoframes::extract_all_parallel(input, output, &options)?
    } else {
        videotoframes::extract_all(input, output, &options)?
    };
    #[cfg(not(feature = "rayon"))]
    let report = {
        if cli.parallel {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                "--parallel requires building with the `rayon` feature".yellow()
            );
        }
        videotoframes::extract_all(input, output, &options)?
    };

    // Clears the progress bar before the summary is printed.
    drop(options);
    print_report(&report, cli.json)
}

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
