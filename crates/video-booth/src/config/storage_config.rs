use crate::AppResult;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use video_booth_core::paths;

const REGISTRATIONS_FILE: &str = "registrations.csv";
const RECORDED_DIR: &str = "RecordedVideos";
const EDITED_DIR: &str = "EditedVideos";
const MERGED_DIR: &str = "MergedVideos";
const LOGS_DIR: &str = "logs";

/// Where booth artifacts are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of all booth data; the platform data dir when `None`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Resolved on-disk layout under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDirs {
    /// Data directory root.
    pub root: PathBuf,
    /// Append-only registration log.
    pub registrations_csv: PathBuf,
    /// Raw recordings.
    pub recorded: PathBuf,
    /// Slow-motion output and QR images.
    pub edited: PathBuf,
    /// Reserved for merged multi-fragment recordings; never written.
    pub merged: PathBuf,
    /// Rolling log files.
    pub logs: PathBuf,
}

impl StorageDirs {
    /// Layout rooted at `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            registrations_csv: root.join(REGISTRATIONS_FILE),
            recorded: root.join(RECORDED_DIR),
            edited: root.join(EDITED_DIR),
            merged: root.join(MERGED_DIR),
            logs: root.join(LOGS_DIR),
        }
    }

    /// Create every directory of the layout.
    pub fn create_all(&self) -> AppResult<()> {
        for dir in [
            &self.root,
            &self.recorded,
            &self.edited,
            &self.merged,
            &self.logs,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        debug!(root = ?self.root, "Storage directories ready");
        Ok(())
    }

    /// Fresh timestamped path for an edited video.
    pub fn next_edited_path(&self, prefix: &str) -> PathBuf {
        paths::next_movie_path(&self.edited, prefix)
    }
}
