//! Point Windows builds at a vcpkg FFmpeg install.
//!
//! `ffmpeg-sys-next` finds FFmpeg through `FFMPEG_DIR` on Windows. When only
//! `VCPKG_ROOT` is set we look for the usual vcpkg layout and tell the user
//! what to export; nothing is linked from here.

use std::{env, path::PathBuf};

const WATCHED_VARIABLES: [&str; 3] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"];

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    let windows = env::var("CARGO_CFG_TARGET_OS").is_ok_and(|os| os == "windows");
    if !windows || env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        println!(
            "cargo:warning=videotoframes needs FFmpeg: set FFMPEG_DIR, or install ffmpeg with vcpkg and set VCPKG_ROOT"
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);

    if candidate.join("include").join("libavcodec").is_dir() {
        println!(
            "cargo:warning=Found FFmpeg under {}; export FFMPEG_DIR={} if the build cannot locate it",
            candidate.display(),
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=No vcpkg FFmpeg install under {}",
            candidate.display()
        );
    }
}
