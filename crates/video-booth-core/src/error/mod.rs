use crate::{capture::CaptureState, edit::ExportStatus};

use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

/// Camera and recording errors with source location tracking.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The requested camera device does not exist or cannot be opened.
    #[error("Camera unavailable: {device} {location}")]
    CameraUnavailable {
        /// Device path or name that was requested.
        device: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An external capture tool (e.g. ffmpeg) is missing or not runnable.
    #[error("Capture tool unavailable: {tool}: {reason} {location}")]
    ToolUnavailable {
        /// Name or path of the tool.
        tool: String,
        /// Why the tool could not be used.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Operation is not allowed in the pipeline's current state.
    #[error("Capture pipeline not ready (state: {state:?}) {location}")]
    NotReady {
        /// State the pipeline was in when the call was rejected.
        state: CaptureState,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Device configuration or session control failed.
    #[error("Capture device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Recording could not be written or finalized.
    #[error("Recording failed: {reason} {location}")]
    RecordingFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Composition and export errors with source location tracking.
#[derive(Error, Debug)]
pub enum EditError {
    /// Source file has no video track.
    #[error("Video track not found in {path:?} {location}")]
    MissingVideoTrack {
        /// Source file that was probed.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Source file has no audio track.
    #[error("Audio track not found in {path:?} {location}")]
    MissingAudioTrack {
        /// Source file that was probed.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Slow-motion parameters or window are unusable.
    #[error("Invalid slow-motion window: {reason} {location}")]
    InvalidWindow {
        /// Why the window was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Reading track and duration information failed.
    #[error("Probe failed: {reason} {location}")]
    ProbeFailed {
        /// Description of the probe failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Export finished with a status other than completed.
    #[error("Export failed: {status} {location}")]
    ExportFailed {
        /// Final status reported by the exporter.
        status: ExportStatus,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Bluetooth peripheral link errors with source location tracking.
#[derive(Error, Debug)]
pub enum LinkError {
    /// No Bluetooth adapter is present.
    #[error("No Bluetooth adapter found {location}")]
    AdapterUnavailable {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The remembered peripheral is not known to the adapter.
    #[error("Peripheral not found: {identifier} {location}")]
    PeripheralNotFound {
        /// Identifier that was looked up.
        identifier: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The write characteristic is not exposed by the peripheral.
    #[error("Characteristic not found: {uuid} {location}")]
    CharacteristicNotFound {
        /// Characteristic UUID that was looked up.
        uuid: uuid::Uuid,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Commands are written as ASCII; other text is refused.
    #[error("Command is not ASCII: {command:?} {location}")]
    NonAsciiCommand {
        /// The rejected command text.
        command: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Underlying Bluetooth stack error.
    #[error("Bluetooth error: {reason} {location}")]
    Transport {
        /// Description of the transport error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Any error raised by the booth core, for callers that drive several
/// subsystems at once.
#[derive(Error, Debug)]
pub enum BoothCoreError {
    /// Camera or recording failure.
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Composition or export failure.
    #[error(transparent)]
    Edit(#[from] EditError),

    /// Peripheral link failure.
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Result type alias using [`BoothCoreError`].
pub type Result<T> = std::result::Result<T, BoothCoreError>;

/// Result type alias using [`CaptureError`].
pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

/// Result type alias using [`EditError`].
pub type EditResult<T> = std::result::Result<T, EditError>;

/// Result type alias using [`LinkError`].
pub type LinkResult<T> = std::result::Result<T, LinkError>;
