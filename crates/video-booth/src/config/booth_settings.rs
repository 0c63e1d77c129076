use crate::config::{BoothConfig, PeripheralConfig, SlowMotionConfig};

use serde::{Deserialize, Serialize};

/// The operator-editable subset of the configuration.
///
/// This is the body of `GET` and `PUT /api/settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoothSettings {
    /// Saved peripheral address.
    pub device_identifier: Option<String>,
    /// Total recording length in seconds.
    pub record_seconds: u64,
    /// Countdown length in seconds.
    pub countdown_seconds: u64,
    /// Slow-motion window start in seconds.
    pub slow_motion_start_seconds: f64,
    /// Slow-motion window length in seconds.
    pub slow_motion_duration_seconds: f64,
    /// Slow-down factor.
    pub slow_motion_multiplier: f64,
    /// ASCII command sent to the peripheral before each countdown.
    pub arm_command: String,
}

impl BoothSettings {
    pub(crate) fn from_sections(
        booth: &BoothConfig,
        slow_motion: &SlowMotionConfig,
        peripheral: &PeripheralConfig,
    ) -> Self {
        Self {
            device_identifier: peripheral.device_identifier.clone(),
            record_seconds: booth.record_seconds,
            countdown_seconds: booth.countdown_seconds,
            slow_motion_start_seconds: slow_motion.start_seconds,
            slow_motion_duration_seconds: slow_motion.duration_seconds,
            slow_motion_multiplier: slow_motion.multiplier,
            arm_command: peripheral.arm_command.clone(),
        }
    }
}
