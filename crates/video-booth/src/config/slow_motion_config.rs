use crate::config::{
    default_slow_motion_duration_seconds, default_slow_motion_multiplier,
    default_slow_motion_start_seconds,
};

use serde::{Deserialize, Serialize};

/// Which part of each recording is slowed down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowMotionConfig {
    /// Offset of the window into the recording.
    #[serde(default = "default_slow_motion_start_seconds")]
    pub start_seconds: f64,
    /// Length of the window in recorded time.
    #[serde(default = "default_slow_motion_duration_seconds")]
    pub duration_seconds: f64,
    /// Slow-down factor.
    #[serde(default = "default_slow_motion_multiplier")]
    pub multiplier: f64,
}

impl Default for SlowMotionConfig {
    fn default() -> Self {
        Self {
            start_seconds: default_slow_motion_start_seconds(),
            duration_seconds: default_slow_motion_duration_seconds(),
            multiplier: default_slow_motion_multiplier(),
        }
    }
}
