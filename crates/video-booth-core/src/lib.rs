//! Video Booth Core Library
//!
//! Hardware-facing half of the video booth: the camera capture pipeline, the
//! slow-motion post-processor and the Bluetooth trigger link. Each backend
//! sits behind a trait so the booth can run against fakes.
//!
//! # Example
//!
//! ```no_run
//! use video_booth_core::{
//!     CoreResult,
//!     edit::{FfmpegToolkit, SlowMotionSpec, VideoEditor},
//! };
//!
//! use std::{path::Path, sync::Arc, time::Duration};
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let editor = VideoEditor::new(Arc::new(FfmpegToolkit::new("ffmpeg", "ffprobe")));
//!     let spec = SlowMotionSpec::new(Duration::from_secs(1), Duration::from_secs(3), 3.0)?;
//!
//!     let edited = editor
//!         .apply_slow_motion(Path::new("raw.mov"), spec, Path::new("edited.mov"))
//!         .await?;
//!
//!     println!("Saved {}", edited.display());
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod edit;
mod error;
pub mod link;
pub mod paths;

pub use error::{
    BoothCoreError, CaptureError, CaptureResult, EditError, EditResult, LinkError, LinkResult,
    Result as CoreResult,
};

#[cfg(test)]
mod tests;
