use crate::config::{default_countdown_seconds, default_file_prefix, default_record_seconds};

use serde::{Deserialize, Serialize};

/// Timing and naming of a booth session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoothConfig {
    /// Maximum recording length; the recording stops on its own after this.
    #[serde(default = "default_record_seconds")]
    pub record_seconds: u64,
    /// Delay between arming the peripheral and starting to record.
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u64,
    /// Prefix of every recorded and edited file name.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            record_seconds: default_record_seconds(),
            countdown_seconds: default_countdown_seconds(),
            file_prefix: default_file_prefix(),
        }
    }
}
