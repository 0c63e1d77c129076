use crate::config::{default_arm_command, default_poll_seconds, default_scan_seconds};

use serde::{Deserialize, Serialize};

/// Bluetooth trigger peripheral configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheralConfig {
    /// Address of the peripheral to reconnect to, `None` until one is chosen.
    #[serde(default)]
    pub device_identifier: Option<String>,
    /// ASCII command written before each countdown.
    #[serde(default = "default_arm_command")]
    pub arm_command: String,
    /// Seconds between link polls.
    #[serde(default = "default_poll_seconds")]
    pub poll_seconds: u64,
    /// Seconds a discovery scan may run.
    #[serde(default = "default_scan_seconds")]
    pub scan_seconds: u64,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self {
            device_identifier: None,
            arm_command: default_arm_command(),
            poll_seconds: default_poll_seconds(),
            scan_seconds: default_scan_seconds(),
        }
    }
}
