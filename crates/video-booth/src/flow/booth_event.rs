use std::fmt;

/// Inputs that move the booth between screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoothEvent {
    /// Customer tapped the start prompt.
    StartTapped,
    /// Registration form passed validation.
    RegistrationAccepted,
    /// Countdown timer ran out.
    CountdownElapsed,
    /// Capture finalized the raw recording.
    RecordingFinished,
    /// Capture could not finalize the recording.
    RecordingFailed,
    /// Slow-motion export completed.
    ProcessingFinished,
    /// Slow-motion export failed.
    ProcessingFailed,
    /// Customer asked to record again.
    RetakeTapped,
    /// Customer accepted the preview.
    UploadTapped,
    /// Upload returned a server file name.
    UploadSucceeded,
    /// Upload failed.
    UploadFailed,
    /// Customer went back to the start.
    HomeTapped,
}

impl fmt::Display for BoothEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
