use crate::{
    AppError, AppResult, BoothCommand, BoothRun,
    config::{Config, StorageDirs},
    flow::{BoothEvent, BoothScreen},
    qr,
    registration::{InvalidField, RegistrationLog, RegistrationValidator},
    uploader::{self, VideoUploader},
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::Arc,
};

use error_location::ErrorLocation;
use serde::Serialize;
use tokio::{
    runtime::Handle,
    sync::{Mutex, mpsc, watch},
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use video_booth_core::{
    CaptureError,
    capture::{CaptureEvent, CapturePipeline, CaptureState},
    edit::VideoEditor,
    link::{CommandOutcome, LinkMonitor},
};

const COMMAND_BUFFER: usize = 32;
const JOB_BUFFER: usize = 8;

/// What the front end shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoothView {
    /// Current screen.
    pub screen: BoothScreen,
    /// Correlation id of the current run.
    pub run_id: Uuid,
    /// Whether the camera session is running.
    pub capture_ready: bool,
    /// Registration fields to flag inline.
    pub invalid_fields: Vec<InvalidField>,
    /// Last failure worth telling the customer about.
    pub message: Option<String>,
    /// Name of the registered customer.
    pub registrant: Option<String>,
    /// Raw recording of the current take.
    pub raw_path: Option<PathBuf>,
    /// Edited video for the preview.
    pub edited_path: Option<PathBuf>,
    /// File name assigned by the server.
    pub server_file_name: Option<String>,
    /// Download link behind the QR code.
    pub download_link: Option<String>,
    /// QR code image.
    pub qr_path: Option<PathBuf>,
}

/// Hardware and network services driven by the controller.
pub struct BoothServices {
    /// Camera session.
    pub capture: CapturePipeline,
    /// Slow-motion exporter.
    pub editor: VideoEditor,
    /// Trigger peripheral.
    pub link: LinkMonitor,
    /// Remote store.
    pub uploader: Arc<dyn VideoUploader>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UploadOutcome {
    server_file_name: String,
    download_link: String,
    qr_path: PathBuf,
}

/// Results of background work, tagged with the run that started it.
#[derive(Debug)]
enum JobResult {
    CountdownElapsed {
        run_id: Uuid,
    },
    ProcessingDone {
        run_id: Uuid,
        result: Result<PathBuf, String>,
    },
    UploadDone {
        run_id: Uuid,
        result: Result<UploadOutcome, String>,
    },
}

/// Owns the booth flow and applies every command, capture event and job
/// result from a single task.
pub struct BoothController {
    config: Arc<Mutex<Config>>,
    dirs: StorageDirs,
    services: BoothServices,
    validator: RegistrationValidator,
    registrations: RegistrationLog,
    handle: Handle,
    screen: BoothScreen,
    run: BoothRun,
    capture_ready: bool,
    invalid_fields: Vec<InvalidField>,
    message: Option<String>,
    command_tx: mpsc::Sender<BoothCommand>,
    command_rx: mpsc::Receiver<BoothCommand>,
    capture_rx: mpsc::Receiver<CaptureEvent>,
    job_tx: mpsc::Sender<JobResult>,
    job_rx: mpsc::Receiver<JobResult>,
    view_tx: watch::Sender<BoothView>,
    shutdown_tx: watch::Sender<bool>,
}

impl BoothController {
    /// Controller on the idle screen.
    ///
    /// `capture_rx` must be the receiving end of the channel the capture
    /// pipeline was built with. Background work is spawned on `handle`.
    #[track_caller]
    pub fn new(
        config: Arc<Mutex<Config>>,
        dirs: StorageDirs,
        services: BoothServices,
        capture_rx: mpsc::Receiver<CaptureEvent>,
        handle: Handle,
        shutdown_tx: watch::Sender<bool>,
    ) -> AppResult<Self> {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (job_tx, job_rx) = mpsc::channel(JOB_BUFFER);
        let run = BoothRun::new();
        let (view_tx, _) = watch::channel(BoothView {
            run_id: run.run_id,
            ..BoothView::default()
        });

        Ok(Self {
            registrations: RegistrationLog::new(dirs.registrations_csv.clone()),
            validator: RegistrationValidator::new()?,
            config,
            dirs,
            services,
            handle,
            screen: BoothScreen::Idle,
            run,
            capture_ready: false,
            invalid_fields: Vec::new(),
            message: None,
            command_tx,
            command_rx,
            capture_rx,
            job_tx,
            job_rx,
            view_tx,
            shutdown_tx,
        })
    }

    /// Sender for UI commands.
    pub fn command_sender(&self) -> mpsc::Sender<BoothCommand> {
        self.command_tx.clone()
    }

    /// Receiver of view updates.
    pub fn subscribe(&self) -> watch::Receiver<BoothView> {
        self.view_tx.subscribe()
    }

    /// Configure the camera, then process messages until shutdown.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> AppResult<()> {
        info!("Video booth starting");

        if let Err(e) = self.services.capture.configure() {
            error!(error = %e, "Failed to start camera setup");
        }

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    match command {
                        Some(BoothCommand::Shutdown) | None => {
                            info!("Shutdown requested");
                            break;
                        }
                        Some(command) => {
                            if let Err(e) = self.handle_command(command).await {
                                warn!(run_id = %self.run.run_id, screen = %self.screen, error = %e, "Command rejected");
                            }
                        }
                    }
                }

                Some(event) = self.capture_rx.recv() => {
                    self.handle_capture_event(event).await;
                }

                Some(job) = self.job_rx.recv() => {
                    self.handle_job(job).await;
                }
            }

            self.publish();
        }

        self.services.capture.shutdown().await;
        self.services.link.disconnect().await;
        let _ = self.shutdown_tx.send(true);

        info!("Video booth shut down");
        Ok(())
    }

    async fn handle_command(&mut self, command: BoothCommand) -> AppResult<()> {
        debug!(command = ?command, screen = %self.screen, "Handling command");

        match command {
            BoothCommand::Start => {
                self.screen.transition(BoothEvent::StartTapped)?;
                let state = self.services.capture.state();
                if state != CaptureState::Ready {
                    self.message = Some("Camera is not ready".to_string());
                    return Err(AppError::from(CaptureError::NotReady {
                        state,
                        location: ErrorLocation::from(Location::caller()),
                    }));
                }
                self.advance(BoothEvent::StartTapped)?;
                self.run = BoothRun::new();
            }
            BoothCommand::SubmitRegistration { name, email, phone } => {
                self.submit_registration(&name, &email, &phone).await?;
            }
            BoothCommand::StopRecording => {
                if self.screen != BoothScreen::Recording {
                    debug!(screen = %self.screen, "Nothing recording, stop ignored");
                    return Ok(());
                }
                if !self.services.capture.stop_recording().await {
                    debug!("Recording already stopping");
                }
            }
            BoothCommand::Retake => {
                self.advance(BoothEvent::RetakeTapped)?;
                self.run.retake();
                self.enter_countdown().await;
            }
            BoothCommand::Upload => {
                let Some(edited) = self.run.edited_path.clone() else {
                    self.screen.transition(BoothEvent::UploadTapped)?;
                    return Err(AppError::UploadFailed {
                        reason: "No edited video to upload".to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    });
                };
                self.advance(BoothEvent::UploadTapped)?;
                self.spawn_upload(edited).await;
            }
            BoothCommand::Home => {
                self.advance(BoothEvent::HomeTapped)?;
                self.run = BoothRun::new();
            }
            BoothCommand::Status => {
                let view = self.view();
                info!(view = ?view, "Booth status");
            }
            BoothCommand::OpenSettings => {
                let url = self.config.lock().await.server_url();
                if let Err(e) = open::that(&url) {
                    warn!(url = %url, error = ?e, "Failed to open settings");
                }
            }
            BoothCommand::Shutdown => {}
        }

        Ok(())
    }

    async fn submit_registration(&mut self, name: &str, email: &str, phone: &str) -> AppResult<()> {
        // Reject before validating so stray submissions leave the form alone.
        self.screen.transition(BoothEvent::RegistrationAccepted)?;

        let registration = match self.validator.validate(name, email, phone) {
            Ok(registration) => registration,
            Err(e) => {
                self.invalid_fields = e.fields.clone();
                return Err(e.into());
            }
        };

        if let Err(e) = self.registrations.append(&registration).await {
            warn!(run_id = %self.run.run_id, error = %e, "Failed to save registration");
        }

        self.run.registration = Some(registration);
        self.advance(BoothEvent::RegistrationAccepted)?;
        self.enter_countdown().await;
        Ok(())
    }

    /// Arm the peripheral and start the countdown timer.
    ///
    /// The elapsed event follows both the arm write and the timer.
    async fn enter_countdown(&mut self) {
        let (arm_command, countdown) = {
            let config = self.config.lock().await;
            (config.peripheral.arm_command.clone(), config.countdown_duration())
        };

        let run_id = self.run.run_id;
        let link = self.services.link.clone();
        let job_tx = self.job_tx.clone();

        info!(run_id = %run_id, countdown_ms = countdown.as_millis(), "Countdown started");

        self.handle.spawn(async move {
            let arm = async {
                match link.send_command(&arm_command).await {
                    Ok(CommandOutcome::Sent) => debug!(run_id = %run_id, "Peripheral armed"),
                    Ok(outcome) => debug!(run_id = %run_id, outcome = ?outcome, "Peripheral not armed"),
                    Err(e) => warn!(run_id = %run_id, error = %e, "Arm command rejected"),
                }
            };
            tokio::join!(arm, tokio::time::sleep(countdown));

            let _ = job_tx.send(JobResult::CountdownElapsed { run_id }).await;
        });
    }

    async fn start_recording(&mut self) {
        let limit = self.config.lock().await.record_duration();

        match self.services.capture.start_recording(Some(limit)).await {
            Ok(path) => {
                info!(run_id = %self.run.run_id, path = ?path, limit_ms = limit.as_millis(), "Recording");
                self.run.raw_path = Some(path);
            }
            Err(e) => {
                error!(run_id = %self.run.run_id, error = %e, "Failed to start recording");
                self.fail(BoothEvent::RecordingFailed, e.to_string());
            }
        }
    }

    async fn handle_capture_event(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Ready(surface) => {
                info!(device = %surface.device, fps = surface.fps, "Camera ready");
                self.capture_ready = true;
            }
            CaptureEvent::SetupFailed { reason } => {
                error!(reason = %reason, "Camera unavailable");
                self.capture_ready = false;
                self.message = Some(format!("Camera unavailable: {}", reason));
            }
            CaptureEvent::RecordingFinished { path, elapsed } => {
                if self.advance(BoothEvent::RecordingFinished).is_err() {
                    debug!(path = ?path, "Recording finished after the run was abandoned");
                    return;
                }
                info!(run_id = %self.run.run_id, path = ?path, elapsed_ms = elapsed.as_millis(), "Recording finished");
                self.run.raw_path = Some(path.clone());
                self.spawn_processing(path).await;
            }
            CaptureEvent::RecordingFailed { reason } => {
                error!(run_id = %self.run.run_id, reason = %reason, "Recording failed");
                self.fail(BoothEvent::RecordingFailed, reason);
            }
        }
    }

    async fn spawn_processing(&mut self, raw: PathBuf) {
        let (spec, prefix) = {
            let config = self.config.lock().await;
            (config.slow_motion_spec(), config.booth.file_prefix.clone())
        };

        let spec = match spec {
            Ok(spec) => spec,
            Err(e) => {
                error!(run_id = %self.run.run_id, error = %e, "Invalid slow-motion settings");
                self.fail(BoothEvent::ProcessingFailed, e.to_string());
                return;
            }
        };

        let output = self.dirs.next_edited_path(&prefix);
        let run_id = self.run.run_id;
        let job_tx = self.job_tx.clone();
        let export = self
            .services
            .editor
            .spawn_slow_motion(&self.handle, raw, spec, output);

        self.handle.spawn(async move {
            let result = match export.await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(e) => Err(format!("Slow-motion task failed: {}", e)),
            };
            let _ = job_tx
                .send(JobResult::ProcessingDone { run_id, result })
                .await;
        });
    }

    async fn spawn_upload(&mut self, edited: PathBuf) {
        let download_url = self.config.lock().await.upload.download_url.clone();
        let uploader = Arc::clone(&self.services.uploader);
        let run_id = self.run.run_id;
        let job_tx = self.job_tx.clone();

        info!(run_id = %run_id, path = ?edited, "Uploading");

        self.handle.spawn(async move {
            let result = upload_and_link(uploader.as_ref(), &edited, &download_url)
                .await
                .map_err(|e| e.to_string());
            let _ = job_tx.send(JobResult::UploadDone { run_id, result }).await;
        });
    }

    async fn handle_job(&mut self, job: JobResult) {
        let run_id = match &job {
            JobResult::CountdownElapsed { run_id }
            | JobResult::ProcessingDone { run_id, .. }
            | JobResult::UploadDone { run_id, .. } => *run_id,
        };

        if run_id != self.run.run_id {
            debug!(stale_run_id = %run_id, run_id = %self.run.run_id, "Discarding result of an abandoned run");
            return;
        }

        match job {
            JobResult::CountdownElapsed { .. } => {
                if self.advance(BoothEvent::CountdownElapsed).is_ok() {
                    self.start_recording().await;
                }
            }
            JobResult::ProcessingDone { result, .. } => match result {
                Ok(path) => {
                    if self.advance(BoothEvent::ProcessingFinished).is_ok() {
                        self.run.edited_path = Some(path);
                    }
                }
                Err(reason) => {
                    error!(run_id = %run_id, reason = %reason, "Slow-motion processing failed");
                    self.fail(BoothEvent::ProcessingFailed, reason);
                }
            },
            JobResult::UploadDone { result, .. } => match result {
                Ok(outcome) => {
                    if self.advance(BoothEvent::UploadSucceeded).is_ok() {
                        info!(run_id = %run_id, file_name = %outcome.server_file_name, "Upload complete");
                        self.run.server_file_name = Some(outcome.server_file_name);
                        self.run.download_link = Some(outcome.download_link);
                        self.run.qr_path = Some(outcome.qr_path);
                    }
                }
                Err(reason) => {
                    error!(run_id = %run_id, reason = %reason, "Upload failed");
                    self.fail(BoothEvent::UploadFailed, reason);
                }
            },
        }
    }

    /// Apply `event`, clearing per-screen feedback on success.
    fn advance(&mut self, event: BoothEvent) -> AppResult<BoothScreen> {
        let next = self.screen.transition(event)?;
        info!(run_id = %self.run.run_id, from = %self.screen, to = %next, event = %event, "Screen changed");
        self.screen = next;
        self.invalid_fields.clear();
        self.message = None;
        Ok(next)
    }

    /// Take a failure edge and keep `reason` for the customer.
    fn fail(&mut self, event: BoothEvent, reason: String) {
        match self.advance(event) {
            Ok(_) => self.message = Some(reason),
            Err(e) => debug!(error = %e, "Failure of an abandoned step ignored"),
        }
    }

    fn view(&self) -> BoothView {
        BoothView {
            screen: self.screen,
            run_id: self.run.run_id,
            capture_ready: self.capture_ready,
            invalid_fields: self.invalid_fields.clone(),
            message: self.message.clone(),
            registrant: self.run.registration.as_ref().map(|r| r.name.clone()),
            raw_path: self.run.raw_path.clone(),
            edited_path: self.run.edited_path.clone(),
            server_file_name: self.run.server_file_name.clone(),
            download_link: self.run.download_link.clone(),
            qr_path: self.run.qr_path.clone(),
        }
    }

    fn publish(&self) {
        let view = self.view();
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                return false;
            }
            *current = view;
            true
        });
    }
}

/// Upload `edited`, build its download link and write the QR code next to it.
async fn upload_and_link(
    uploader: &dyn VideoUploader,
    edited: &Path,
    download_url: &str,
) -> AppResult<UploadOutcome> {
    let server_file_name = uploader.upload(edited).await?;
    let download_link = uploader::download_link(download_url, &server_file_name)?;
    let qr_path = qr::qr_path_for(edited);

    let payload = download_link.clone();
    let output = qr_path.clone();
    tokio::task::spawn_blocking(move || qr::write_qr_png(&payload, &output))
        .await
        .map_err(|e| AppError::QrError {
            reason: format!("QR task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })??;

    Ok(UploadOutcome {
        server_file_name,
        download_link,
        qr_path,
    })
}
