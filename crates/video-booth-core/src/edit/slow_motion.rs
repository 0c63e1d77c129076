use crate::{EditError, EditResult, edit::TimeRange};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;

/// Default slow-down factor applied to the window.
pub const DEFAULT_MULTIPLIER: f64 = 3.0;

/// Largest accepted slow-down factor.
pub const MAX_MULTIPLIER: f64 = 16.0;

/// Longest window start or length accepted, in source time.
pub const MAX_WINDOW: Duration = Duration::from_secs(6 * 60 * 60);

/// Which part of a recording to slow down, and by how much.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlowMotionSpec {
    /// Offset of the window into the source.
    pub start: Duration,
    /// Length of the window in source time.
    pub duration: Duration,
    /// How many times longer the window plays (3.0 = one third speed).
    pub multiplier: f64,
}

impl SlowMotionSpec {
    /// Validates and builds a spec.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWindow` for an empty window, a start or length beyond
    /// [`MAX_WINDOW`], or a multiplier outside `1..=MAX_MULTIPLIER`.
    #[track_caller]
    pub fn new(start: Duration, duration: Duration, multiplier: f64) -> EditResult<Self> {
        if duration.is_zero() {
            return Err(EditError::InvalidWindow {
                reason: "window duration must be greater than zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if start > MAX_WINDOW || duration > MAX_WINDOW {
            return Err(EditError::InvalidWindow {
                reason: format!(
                    "window {:.3}s + {:.3}s exceeds the {}s limit",
                    start.as_secs_f64(),
                    duration.as_secs_f64(),
                    MAX_WINDOW.as_secs()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !(1.0..=MAX_MULTIPLIER).contains(&multiplier) {
            return Err(EditError::InvalidWindow {
                reason: format!("multiplier must be within 1..={MAX_MULTIPLIER}, got {multiplier}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self {
            start,
            duration,
            multiplier,
        })
    }

    /// The window clamped to a source of `source_duration`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWindow` when the window starts at or after the end of
    /// the source.
    #[track_caller]
    pub fn window_within(&self, source_duration: Duration) -> EditResult<TimeRange> {
        if self.start >= source_duration {
            return Err(EditError::InvalidWindow {
                reason: format!(
                    "window starts at {:.3}s but source is only {:.3}s long",
                    self.start.as_secs_f64(),
                    source_duration.as_secs_f64()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let end = self.start.saturating_add(self.duration).min(source_duration);
        Ok(TimeRange::new(self.start, end - self.start))
    }

    /// Output length of `window` once slowed down.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWindow` when the result is not a representable
    /// duration.
    #[track_caller]
    pub fn stretched(&self, window: TimeRange) -> EditResult<Duration> {
        Duration::try_from_secs_f64(window.duration.as_secs_f64() * self.multiplier).map_err(|e| {
            EditError::InvalidWindow {
                reason: format!(
                    "{:.3}s slowed {}x is out of range: {}",
                    window.duration.as_secs_f64(),
                    self.multiplier,
                    e
                ),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}
