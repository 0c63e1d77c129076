use crate::{
    CaptureError, CaptureResult,
    capture::{
        CaptureDevice, CaptureEvent, CaptureFormat, CaptureSettings, CaptureState, PreviewSurface,
    },
    paths,
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tokio::{
    runtime::Handle,
    sync::{Mutex as AsyncMutex, mpsc},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};

/// State shared between the pipeline handle and its background tasks.
struct Shared {
    /// Serial queue: every device call goes through this lock.
    device: AsyncMutex<Box<dyn CaptureDevice>>,
    state: Mutex<CaptureState>,
    /// Set by the first stop request of a recording, cleared once the
    /// pipeline is back to `Ready`.
    stopping: AtomicBool,
    /// Incremented per recording so a late auto-stop timer cannot stop a
    /// newer recording.
    generation: AtomicU64,
    started_at: Mutex<Option<Instant>>,
    events_tx: mpsc::Sender<CaptureEvent>,
}

impl Shared {
    fn state(&self) -> CaptureState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, next: CaptureState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        debug!(from = ?*state, to = ?next, "Capture state changed");
        *state = next;
    }

    /// Atomically moves `from -> to`. Returns the actual state on mismatch.
    fn transition(&self, from: CaptureState, to: CaptureState) -> Result<(), CaptureState> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state != from {
            return Err(*state);
        }
        debug!(from = ?from, to = ?to, "Capture state changed");
        *state = to;
        Ok(())
    }

    async fn emit(&self, event: CaptureEvent) {
        if self.events_tx.send(event).await.is_err() {
            warn!("Capture event receiver dropped");
        }
    }

    /// Performs the underlying stop at most once per recording.
    ///
    /// Returns `true` only for the call that actually stopped the device.
    async fn stop(&self, generation: Option<u64>) -> bool {
        if let Some(expected) = generation
            && self.generation.load(Ordering::Acquire) != expected
        {
            debug!(expected, "Auto-stop for a previous recording ignored");
            return false;
        }

        if self.stopping.swap(true, Ordering::AcqRel) {
            debug!("Stop already in progress");
            return false;
        }

        if let Err(state) = self.transition(CaptureState::Recording, CaptureState::Stopping) {
            debug!(state = ?state, "Stop requested while not recording");
            self.stopping.store(false, Ordering::Release);
            return false;
        }

        let elapsed = self
            .started_at
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .map(|t| t.elapsed())
            .unwrap_or_default();

        let result = {
            let mut device = self.device.lock().await;
            device.stop().await
        };

        // Clear the guard before leaving `Stopping` so a stop request that
        // races with this one still observes a non-recording state.
        self.stopping.store(false, Ordering::Release);
        self.set_state(CaptureState::Ready);

        match result {
            Ok(path) => {
                info!(path = ?path, elapsed_ms = elapsed.as_millis(), "Recording finished");
                self.emit(CaptureEvent::RecordingFinished { path, elapsed })
                    .await;
            }
            Err(e) => {
                error!(error = %e, "Recording failed");
                self.emit(CaptureEvent::RecordingFailed {
                    reason: e.to_string(),
                })
                .await;
            }
        }

        true
    }
}

/// Owns the capture session and drives the recording state machine.
///
/// Cloning yields another handle to the same session. Results of
/// asynchronous work (setup, stop) are delivered as [`CaptureEvent`]s on the
/// channel given to [`CapturePipeline::new`]; background work runs on the
/// runtime handle passed in, never on an implicit executor.
#[derive(Clone)]
pub struct CapturePipeline {
    shared: Arc<Shared>,
    settings: CaptureSettings,
    handle: Handle,
}

impl CapturePipeline {
    /// Creates an unconfigured pipeline around `device`.
    pub fn new(
        device: Box<dyn CaptureDevice>,
        settings: CaptureSettings,
        handle: Handle,
        events_tx: mpsc::Sender<CaptureEvent>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                device: AsyncMutex::new(device),
                state: Mutex::new(CaptureState::Uninitialized),
                stopping: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                started_at: Mutex::new(None),
                events_tx,
            }),
            settings,
            handle,
        }
    }

    /// Current pipeline state.
    pub fn state(&self) -> CaptureState {
        self.shared.state()
    }

    /// Acquire devices and start the session in the background.
    ///
    /// Completion is reported as [`CaptureEvent::Ready`] or
    /// [`CaptureEvent::SetupFailed`].
    ///
    /// # Errors
    ///
    /// Returns `NotReady` unless the pipeline is `Uninitialized`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn configure(&self) -> CaptureResult<JoinHandle<()>> {
        self.shared
            .transition(CaptureState::Uninitialized, CaptureState::Configuring)
            .map_err(|state| CaptureError::NotReady {
                state,
                location: ErrorLocation::from(Location::caller()),
            })?;

        let shared = Arc::clone(&self.shared);
        let settings = self.settings.clone();

        Ok(self.handle.spawn(async move {
            let result = {
                let mut device = shared.device.lock().await;
                match device
                    .open(settings.position, settings.audio_enabled)
                    .await
                {
                    Ok(surface) => match device.apply_format(settings.format).await {
                        Ok(()) => Ok(PreviewSurface {
                            fps: settings.format.fps(),
                            ..surface
                        }),
                        Err(e) => {
                            device.close().await;
                            Err(e)
                        }
                    },
                    Err(e) => Err(e),
                }
            };

            match result {
                Ok(surface) => {
                    shared.set_state(CaptureState::Ready);
                    info!(
                        device = %surface.device,
                        width = surface.width,
                        height = surface.height,
                        fps = surface.fps,
                        audio = surface.audio,
                        "Capture session ready"
                    );
                    shared.emit(CaptureEvent::Ready(surface)).await;
                }
                Err(e) => {
                    shared.set_state(CaptureState::Uninitialized);
                    error!(error = %e, "Capture setup failed");
                    shared
                        .emit(CaptureEvent::SetupFailed {
                            reason: e.to_string(),
                        })
                        .await;
                }
            }
        }))
    }

    /// Change the frame-rate configuration of a running session.
    ///
    /// # Errors
    ///
    /// Returns `NotReady` unless the pipeline is `Ready`.
    #[instrument(skip(self))]
    pub async fn apply_format(&self, format: CaptureFormat) -> CaptureResult<()> {
        let state = self.shared.state();
        if state != CaptureState::Ready {
            return Err(CaptureError::NotReady {
                state,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut device = self.shared.device.lock().await;
        device.apply_format(format).await?;
        info!(fps = format.fps(), "Capture format applied");
        Ok(())
    }

    /// Begin recording to a fresh timestamped file.
    ///
    /// With `auto_stop` set, the recording is stopped after that duration
    /// unless it was stopped manually first.
    ///
    /// # Errors
    ///
    /// Returns `NotReady` unless the pipeline is `Ready`, or the device error
    /// if writing could not start.
    #[instrument(skip(self))]
    pub async fn start_recording(&self, auto_stop: Option<Duration>) -> CaptureResult<PathBuf> {
        self.shared
            .transition(CaptureState::Ready, CaptureState::Recording)
            .map_err(|state| CaptureError::NotReady {
                state,
                location: ErrorLocation::from(Location::caller()),
            })?;

        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;

        if let Err(e) = tokio::fs::create_dir_all(&self.settings.output_dir).await {
            self.shared.set_state(CaptureState::Ready);
            return Err(CaptureError::RecordingFailed {
                reason: format!(
                    "Failed to create {}: {}",
                    self.settings.output_dir.display(),
                    e
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let path = paths::next_movie_path(&self.settings.output_dir, &self.settings.file_prefix);

        let started = {
            let mut device = self.shared.device.lock().await;
            device.start(&path).await
        };

        if let Err(e) = started {
            self.shared.set_state(CaptureState::Ready);
            return Err(e);
        }

        *self
            .shared
            .started_at
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());

        info!(path = ?path, generation, "Recording started");

        if let Some(limit) = auto_stop {
            let shared = Arc::clone(&self.shared);
            self.handle.spawn(async move {
                tokio::time::sleep(limit).await;
                if shared.stop(Some(generation)).await {
                    debug!(limit_ms = limit.as_millis(), "Recording auto-stopped");
                }
            });
        }

        Ok(path)
    }

    /// Stop the current recording.
    ///
    /// Idempotent: only the first call for a recording stops the device;
    /// later calls (manual or timer) return `false` without side effects.
    #[instrument(skip(self))]
    pub async fn stop_recording(&self) -> bool {
        self.shared.stop(None).await
    }

    /// Stop any recording, close the session and release devices.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        if self.shared.state() == CaptureState::Recording {
            let _stopped = self.shared.stop(None).await;
        }

        let mut device = self.shared.device.lock().await;
        device.close().await;
        self.shared.set_state(CaptureState::Uninitialized);

        info!("Capture session closed");
    }
}
