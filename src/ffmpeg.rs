//! FFmpeg initialisation and log level control.
//!
//! FFmpeg prints its own diagnostics to stderr, independently of the Rust
//! [`log`](https://crates.io/crates/log) facade used by this crate. A video
//! with a slightly damaged stream can produce hundreds of decoder warnings,
//! so callers usually want to tune this before extracting.
//!
//! # Example
//!
//! ```no_run
//! use videotoframes::FfmpegLogLevel;
//!
//! videotoframes::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! ```

use std::{fmt, str::FromStr};

use ffmpeg_next::util::log::Level;

use crate::error::ExtractError;

/// FFmpeg internal log verbosity, from quietest to noisiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Only conditions that abort the process.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's own default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Everything.
    Trace,
}

impl FfmpegLogLevel {
    const NAMES: [(&'static str, FfmpegLogLevel); 9] = [
        ("quiet", FfmpegLogLevel::Quiet),
        ("panic", FfmpegLogLevel::Panic),
        ("fatal", FfmpegLogLevel::Fatal),
        ("error", FfmpegLogLevel::Error),
        ("warning", FfmpegLogLevel::Warning),
        ("info", FfmpegLogLevel::Info),
        ("verbose", FfmpegLogLevel::Verbose),
        ("debug", FfmpegLogLevel::Debug),
        ("trace", FfmpegLogLevel::Trace),
    ];

    fn as_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }

    fn name(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, level)| *level == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }
}

impl fmt::Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = ExtractError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        let lowered = if lowered == "warn" { "warning".to_string() } else { lowered };
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, level)| *level)
            .ok_or_else(|| ExtractError::InvalidArgument(format!("unknown FFmpeg log level: {value}")))
    }
}

/// Set FFmpeg's own console verbosity.
///
/// Does not affect messages emitted through the `log` crate.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.as_level());
    log::debug!("FFmpeg log level set to {level}");
}

/// Initialise the FFmpeg libraries. Safe to call more than once.
pub(crate) fn init() -> Result<(), ExtractError> {
    ffmpeg_next::init().map_err(ExtractError::from)
}
