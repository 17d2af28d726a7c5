//! Build script for songdeck-compile
//!
//! Captures build identification for the startup banner:
//! - Git commit hash (short form), or `SONGDECK_BUILD_ID` for tarball builds
//! - Build timestamp
//! - Build profile (debug/release)

use std::process::Command;

fn main() {
    // Any rerun-if line replaces cargo's "any package file" default
    println!("cargo:rerun-if-env-changed=SONGDECK_BUILD_ID");
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=build.rs");

    let git_hash = std::env::var("SONGDECK_BUILD_ID")
        .ok()
        .filter(|id| !id.trim().is_empty())
        .or_else(git_short_hash)
        .unwrap_or_else(|| "unknown".to_string());

    // RFC 3339 with local offset, e.g. 2025-10-26T14:30:45-05:00
    let build_timestamp = chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false);

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);
}

fn git_short_hash() -> Option<String> {
    Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}
