use crate::flow::{BoothEvent, BoothScreen};

use error_location::ErrorLocation;
use thiserror::Error;

/// Rejected screen transitions.
#[derive(Error, Debug)]
pub enum FlowError {
    /// `event` has no edge out of `from`.
    #[error("{event} is not allowed on {from} {location}")]
    InvalidTransition {
        /// Screen the booth was on.
        from: BoothScreen,
        /// Event that was rejected.
        event: BoothEvent,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}
