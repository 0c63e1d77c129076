//! Video Booth: registration, countdown, slow-motion recording, upload and
//! QR hand-off for a kiosk camera booth.

mod booth_command;
mod booth_run;
mod config;
mod console;
mod controller;
mod error;
mod flow;
mod logging;
mod qr;
mod registration;
mod settings_server;
#[cfg(test)]
mod tests;
mod uploader;

pub(crate) use {
    booth_command::BoothCommand,
    booth_run::BoothRun,
    console::Console,
    controller::{BoothController, BoothServices},
    error::{AppError, Result as AppResult},
    settings_server::SettingsState,
    uploader::HttpUploader,
};

use crate::config::{Config, StorageDirs};

use std::{sync::Arc, time::Duration};

use tokio::{
    runtime::Handle,
    sync::{Mutex, mpsc, watch},
};
use tracing::{error, info, warn};
use video_booth_core::{
    capture::{CapturePipeline, FfmpegCamera},
    edit::{FfmpegToolkit, VideoEditor},
    link::{LinkMonitor, PeripheralIds, PeripheralTransport},
};

const CAPTURE_EVENT_BUFFER: usize = 16;
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Application entry point.
fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let dirs = match config.storage_dirs().and_then(|dirs| {
        dirs.create_all()?;
        Ok(dirs)
    }) {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to prepare storage: {}", e);
            std::process::exit(1);
        }
    };

    // Flushes the log file on drop.
    let _log_guard = logging::init(&dirs.logs);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(run(config, dirs));

    // The console's pending stdin read never returns on its own.
    rt.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);

    if let Err(e) = result {
        error!(error = ?e, "Video booth failed");
        std::process::exit(1);
    }
}

async fn run(config: Config, dirs: StorageDirs) -> AppResult<()> {
    let handle = Handle::current();
    let config_path = Config::config_path()?;

    info!(root = ?dirs.root, config_path = ?config_path, "Video booth configured");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (capture_tx, capture_rx) = mpsc::channel(CAPTURE_EVENT_BUFFER);

    let capture = CapturePipeline::new(
        Box::new(FfmpegCamera::new(config.ffmpeg_camera())),
        config.capture_settings(&dirs),
        handle.clone(),
        capture_tx,
    );

    let editor = VideoEditor::new(Arc::new(FfmpegToolkit::new(
        &config.camera.ffmpeg,
        &config.camera.ffprobe,
    )));

    let link = LinkMonitor::new(
        peripheral_transport().await,
        PeripheralIds::default(),
        config.peripheral.device_identifier.clone(),
        handle.clone(),
    )
    .with_scan_timeout(Duration::from_secs(config.peripheral.scan_seconds));

    let uploader = Arc::new(HttpUploader::new(
        config.upload.upload_url.clone(),
        Duration::from_secs(config.upload.timeout_seconds),
    )?);

    let poll_interval = Duration::from_secs(config.peripheral.poll_seconds);
    let port = config.server.port;
    let config = Arc::new(Mutex::new(config));

    let controller = BoothController::new(
        Arc::clone(&config),
        dirs,
        BoothServices {
            capture,
            editor,
            link: link.clone(),
            uploader,
        },
        capture_rx,
        handle.clone(),
        shutdown_tx,
    )?;

    let command_tx = controller.command_sender();
    let console = Console::new(command_tx.clone(), controller.subscribe());

    let monitor = link.clone();
    let monitor_shutdown = shutdown_rx.clone();
    let monitor_task =
        handle.spawn(async move { monitor.run(poll_interval, monitor_shutdown).await });

    let settings = SettingsState {
        config,
        config_path,
        link,
    };
    let server_task = handle.spawn(settings_server::serve(port, settings, shutdown_rx.clone()));

    let console_task = handle.spawn(console.run(shutdown_rx.clone()));

    handle.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            let _ = command_tx.send(BoothCommand::Shutdown).await;
        }
    });

    let result = controller.run().await;

    if let Err(e) = monitor_task.await {
        error!(error = ?e, "Link monitor task panicked");
    }

    match server_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = ?e, "Settings server error"),
        Err(e) => error!(error = ?e, "Settings server task panicked"),
    }

    match tokio::time::timeout(Duration::from_secs(1), console_task).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => error!(error = ?e, "Console error"),
        Ok(Err(e)) => error!(error = ?e, "Console task panicked"),
        Err(_) => info!("Console did not stop within timeout, will be cleaned up on exit"),
    }

    result
}

#[cfg(feature = "ble")]
async fn peripheral_transport() -> Arc<dyn PeripheralTransport> {
    match video_booth_core::link::BleTransport::new().await {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            warn!(error = ?e, "Bluetooth unavailable, trigger disabled");
            Arc::new(video_booth_core::link::DisabledTransport)
        }
    }
}

#[cfg(not(feature = "ble"))]
async fn peripheral_transport() -> Arc<dyn PeripheralTransport> {
    warn!("Built without Bluetooth support, trigger disabled");
    Arc::new(video_booth_core::link::DisabledTransport)
}
