//! Timestamped output file naming shared by capture and editing.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeDelta};

/// Extension of every movie file the booth writes.
pub const MOVIE_EXTENSION: &str = "mov";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";

/// Builds `<dir>/<prefix>_yyyyMMdd_HHmmssSSS.mov` for the given instant.
pub fn timestamped_movie_path(dir: &Path, prefix: &str, at: DateTime<Local>) -> PathBuf {
    let stamp = at.format(TIMESTAMP_FORMAT);
    dir.join(format!("{prefix}_{stamp}.{MOVIE_EXTENSION}"))
}

/// [`timestamped_movie_path`] for the current local time, moved forward a
/// millisecond at a time past any file that already exists.
pub fn next_movie_path(dir: &Path, prefix: &str) -> PathBuf {
    let mut at = Local::now();
    loop {
        let path = timestamped_movie_path(dir, prefix, at);
        if !path.exists() {
            return path;
        }
        at += TimeDelta::milliseconds(1);
    }
}
