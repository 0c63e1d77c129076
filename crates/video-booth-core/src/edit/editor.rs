use crate::{
    EditError, EditResult,
    edit::{
        Composition, ContainerType, ExportPreset, ExportRequest, ExportStatus, MediaToolkit,
        SlowMotionSpec,
    },
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use error_location::ErrorLocation;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

/// Applies the slow-motion effect to finished recordings.
#[derive(Clone)]
pub struct VideoEditor {
    toolkit: Arc<dyn MediaToolkit>,
}

impl VideoEditor {
    /// Creates an editor backed by `toolkit`.
    pub fn new(toolkit: Arc<dyn MediaToolkit>) -> Self {
        Self { toolkit }
    }

    /// Slow down `spec`'s window of `source` and export to `output`.
    ///
    /// Video and audio are stretched together; time outside the window keeps
    /// normal speed. The export is a QuickTime file at the highest quality
    /// preset.
    ///
    /// # Errors
    ///
    /// - `MissingVideoTrack` / `MissingAudioTrack` when the source lacks one
    ///   (checked before anything is exported)
    /// - `InvalidWindow` when the window starts past the end of the source
    /// - `ExportFailed` for any export status other than completed
    #[instrument(skip(self))]
    pub async fn apply_slow_motion(
        &self,
        source: &Path,
        spec: SlowMotionSpec,
        output: &Path,
    ) -> EditResult<PathBuf> {
        let info = self.toolkit.probe(source).await?;

        if !info.has_video {
            warn!(path = ?source, "Video track not found");
            return Err(EditError::MissingVideoTrack {
                path: source.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !info.has_audio {
            warn!(path = ?source, "Audio track not found");
            return Err(EditError::MissingAudioTrack {
                path: source.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let window = spec.window_within(info.duration)?;
        let stretched = spec.stretched(window)?;
        let mut composition = Composition::from_source(info.duration, true);
        composition.scale_time_range(window, stretched);

        debug!(
            source_ms = info.duration.as_millis(),
            window_start_ms = window.start.as_millis(),
            window_ms = window.duration.as_millis(),
            multiplier = spec.multiplier,
            output_ms = composition.duration().as_millis(),
            "Composition built"
        );

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EditError::ExportFailed {
                    status: ExportStatus::Failed {
                        reason: format!("Failed to create {}: {}", parent.display(), e),
                    },
                    location: ErrorLocation::from(Location::caller()),
                })?;
        }

        let request = ExportRequest {
            source: source.to_path_buf(),
            composition,
            output: output.to_path_buf(),
            preset: ExportPreset::HighestQuality,
            container: ContainerType::Mov,
        };

        let start = Instant::now();
        let status = self.toolkit.export(&request).await?;

        match status {
            ExportStatus::Completed => {
                info!(
                    output = ?output,
                    duration_ms = start.elapsed().as_millis(),
                    "Slow-motion video saved"
                );
                Ok(output.to_path_buf())
            }
            status => {
                warn!(status = %status, "Export failed");
                Err(EditError::ExportFailed {
                    status,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Run [`apply_slow_motion`](Self::apply_slow_motion) on `handle`.
    ///
    /// The returned handle resolves on whatever context awaits it, so callers
    /// decide where the result is observed.
    pub fn spawn_slow_motion(
        &self,
        handle: &Handle,
        source: PathBuf,
        spec: SlowMotionSpec,
        output: PathBuf,
    ) -> JoinHandle<EditResult<PathBuf>> {
        let editor = self.clone();
        handle.spawn(async move { editor.apply_slow_motion(&source, spec, &output).await })
    }
}
