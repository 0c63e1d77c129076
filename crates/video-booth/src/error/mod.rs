use crate::{flow::FlowError, registration::ValidationError};

use video_booth_core::{CaptureError, EditError, LinkError};

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the video-booth binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Camera subsystem error from video-booth-core.
    #[error("Capture error: {source} {location}")]
    Capture {
        /// The underlying capture error.
        #[source]
        source: CaptureError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Slow-motion processing error from video-booth-core.
    #[error("Edit error: {source} {location}")]
    Edit {
        /// The underlying edit error.
        #[source]
        source: EditError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Bluetooth peripheral error from video-booth-core.
    #[error("Link error: {source} {location}")]
    Link {
        /// The underlying link error.
        #[source]
        source: LinkError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Event not allowed on the current screen.
    #[error("Flow error: {source} {location}")]
    Flow {
        /// The rejected transition.
        #[source]
        source: FlowError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Registration form rejected.
    #[error("Registration invalid: {source} {location}")]
    Validation {
        /// The failing fields.
        #[source]
        source: ValidationError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Upload request failed or returned no file name.
    #[error("Upload failed: {reason} {location}")]
    UploadFailed {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// QR code could not be generated or written.
    #[error("QR code error: {reason} {location}")]
    QrError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to send message through async channel.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Settings server failed to bind or serve.
    #[error("Settings server error: {reason} {location}")]
    ServerError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

// Manual From impls with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<CaptureError> for AppError {
    #[track_caller]
    fn from(source: CaptureError) -> Self {
        AppError::Capture {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<EditError> for AppError {
    #[track_caller]
    fn from(source: EditError) -> Self {
        AppError::Edit {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<LinkError> for AppError {
    #[track_caller]
    fn from(source: LinkError) -> Self {
        AppError::Link {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<FlowError> for AppError {
    #[track_caller]
    fn from(source: FlowError) -> Self {
        AppError::Flow {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ValidationError> for AppError {
    #[track_caller]
    fn from(source: ValidationError) -> Self {
        AppError::Validation {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
