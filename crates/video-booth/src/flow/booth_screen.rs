use crate::flow::{BoothEvent, FlowError};

use std::{fmt, panic::Location};

use error_location::ErrorLocation;
use serde::Serialize;

/// Screens of one booth cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoothScreen {
    /// Waiting for a customer.
    #[default]
    Idle,
    /// Collecting name, email and phone.
    Registration,
    /// Peripheral armed, counting down to recording.
    Countdown,
    /// Camera writing the raw file.
    Recording,
    /// Slow-motion export running.
    Processing,
    /// Showing the edited video.
    Preview,
    /// Upload running.
    Uploading,
    /// Showing the download QR code.
    QrDisplay,
}

impl BoothScreen {
    /// Screen reached by applying `event`.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` for every pair without an edge. Stale results of
    /// background work land here and are dropped by the caller.
    #[track_caller]
    pub fn transition(self, event: BoothEvent) -> Result<BoothScreen, FlowError> {
        use BoothEvent as E;
        use BoothScreen as S;

        let next = match (self, event) {
            (S::Idle, E::StartTapped) => S::Registration,
            (S::Registration, E::RegistrationAccepted) => S::Countdown,
            (S::Registration, E::HomeTapped) => S::Idle,
            (S::Countdown, E::CountdownElapsed) => S::Recording,
            (S::Recording, E::RecordingFinished) => S::Processing,
            (S::Recording, E::RecordingFailed) => S::Idle,
            (S::Processing, E::ProcessingFinished) => S::Preview,
            (S::Processing, E::ProcessingFailed) => S::Idle,
            (S::Preview, E::RetakeTapped) => S::Countdown,
            (S::Preview, E::UploadTapped) => S::Uploading,
            (S::Uploading, E::UploadSucceeded) => S::QrDisplay,
            (S::Uploading, E::UploadFailed) => S::Preview,
            (S::QrDisplay, E::HomeTapped) => S::Idle,
            (from, event) => {
                return Err(FlowError::InvalidTransition {
                    from,
                    event,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        Ok(next)
    }
}

impl fmt::Display for BoothScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
