//! Build script for pr-report - embeds a human-readable build string.
//!
//! The string is `<crate version> (<git describe>) <rustc --version>`, with
//! each part after the version omitted when it cannot be determined. It is
//! exposed to the crate as `BUILD_INFO_HUMAN` and shown by `--version`.
//!
//! When the checkout has no tags, `git describe` only yields a hash; in that
//! case a pseudo-version `v{version}-{timestamp}-{commit}[+dirty]` is used
//! instead, where the timestamp is the commit time for clean trees and the
//! build time for dirty ones.

use std::process::Command;

use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

fn main() {
    for path in ["src", "build.rs", "Cargo.toml", "Cargo.lock"] {
        println!("cargo:rerun-if-changed={path}");
    }

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", build_info());
}

/// Runs a command and returns its trimmed stdout if it succeeded and printed
/// something.
fn capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// `Some(true)` when tracked files have uncommitted changes, `None` outside
/// a git checkout.
fn working_tree_dirty() -> Option<bool> {
    capture("git", &["status", "--porcelain", "--untracked-files=no"])
        .map(|_| true)
        .or_else(|| capture("git", &["rev-parse", "--git-dir"]).map(|_| false))
}

fn pseudo_version() -> String {
    let commit =
        capture("git", &["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".into());
    let dirty = working_tree_dirty();

    let commit_time = capture("git", &["log", "-1", "--format=%ct"])
        .and_then(|secs| secs.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0));
    let timestamp = match (dirty, commit_time) {
        (Some(false), Some(time)) => time,
        _ => Utc::now(),
    };

    format!(
        "v{}-{}-{}{}",
        env!("CARGO_PKG_VERSION"),
        timestamp.format(TIMESTAMP_FORMAT),
        commit,
        if dirty == Some(true) { "+dirty" } else { "" }
    )
}

fn git_version() -> String {
    match capture("git", &["describe", "--tags", "--always", "--dirty"]) {
        Some(desc) if desc.contains('v') || desc.contains("-g") => desc,
        _ => pseudo_version(),
    }
}

fn build_info() -> String {
    let mut parts = vec![
        env!("CARGO_PKG_VERSION").to_string(),
        format!("({})", git_version()),
    ];
    parts.extend(capture("rustc", &["--version"]));
    parts.join(" ")
}
