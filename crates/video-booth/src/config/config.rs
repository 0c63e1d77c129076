//! Configuration management for video-booth.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        BoothConfig, BoothSettings, CameraConfig, PeripheralConfig, ServerConfig,
        SlowMotionConfig, StorageConfig, StorageDirs, UploadConfig,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use video_booth_core::{
    capture::{CaptureSettings, DEFAULT_STOP_TIMEOUT, FfmpegCameraConfig},
    edit::{MAX_MULTIPLIER, MAX_WINDOW, SlowMotionSpec},
};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Session timing and naming.
    #[serde(default)]
    pub booth: BoothConfig,
    /// Slow-motion window.
    #[serde(default)]
    pub slow_motion: SlowMotionConfig,
    /// Bluetooth trigger peripheral.
    #[serde(default)]
    pub peripheral: PeripheralConfig,
    /// Camera and media tools.
    #[serde(default)]
    pub camera: CameraConfig,
    /// Remote upload.
    #[serde(default)]
    pub upload: UploadConfig,
    /// On-disk layout.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Embedded settings server.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from the platform config dir, creating a default
    /// file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `config_path`, writing defaults there if the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// `ConfigError` if the file cannot be read, parsed or fails validation.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            info!(config_path = ?config_path, "No config found, creating default");
            let config = Config::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        config.validate()?;

        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Check the values the booth relies on.
    ///
    /// # Errors
    ///
    /// `ConfigError` naming the first invalid value.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        let invalid = |reason: String| AppError::ConfigError {
            reason,
            location: ErrorLocation::from(Location::caller()),
        };

        if self.booth.record_seconds == 0 || self.booth.record_seconds > MAX_WINDOW.as_secs() {
            return Err(invalid(format!(
                "booth.record_seconds must be within 1..={}",
                MAX_WINDOW.as_secs()
            )));
        }

        let record = self.booth.record_seconds as f64;
        let start = self.slow_motion.start_seconds;
        let duration = self.slow_motion.duration_seconds;

        if !start.is_finite() || start < 0.0 || start >= record {
            return Err(invalid(format!(
                "slow_motion.start_seconds must be within 0..{record}, got {start}"
            )));
        }

        if !duration.is_finite() || duration <= 0.0 || start + duration > record {
            return Err(invalid(format!(
                "slow-motion window {start}s + {duration}s must fit inside {record}s of recording"
            )));
        }

        let multiplier = self.slow_motion.multiplier;
        if !(1.0..=MAX_MULTIPLIER).contains(&multiplier) {
            return Err(invalid(format!(
                "slow_motion.multiplier must be within 1..={MAX_MULTIPLIER}, got {multiplier}"
            )));
        }

        // Slow motion stretches the sound track too; raw files without one fail export.
        if !self.camera.audio_enabled || self.camera.audio_source.is_none() {
            return Err(invalid(
                "camera.audio_enabled must be true with a camera.audio_source set".into(),
            ));
        }

        if self.peripheral.arm_command.is_empty() || !self.peripheral.arm_command.is_ascii() {
            return Err(invalid(
                "peripheral.arm_command must be non-empty ASCII".into(),
            ));
        }

        if self.peripheral.poll_seconds == 0 || self.peripheral.scan_seconds == 0 {
            return Err(invalid(
                "peripheral.poll_seconds and peripheral.scan_seconds must be greater than 0".into(),
            ));
        }

        for (key, url) in [
            ("upload.upload_url", &self.upload.upload_url),
            ("upload.download_url", &self.upload.download_url),
        ] {
            if url.trim().is_empty() {
                return Err(invalid(format!("{key} must not be empty")));
            }
            Url::parse(url).map_err(|e| invalid(format!("{key} is not a valid URL: {e}")))?;
        }

        self.slow_motion_spec()?;

        Ok(())
    }

    /// Save configuration to `config_path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
            debug!(config_dir = ?parent, "Created config directory");
        }

        // Atomic write: write to temp file then rename
        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// The operator-editable settings.
    pub fn booth_settings(&self) -> BoothSettings {
        BoothSettings::from_sections(&self.booth, &self.slow_motion, &self.peripheral)
    }

    /// Apply `settings` if the resulting configuration is valid.
    ///
    /// On error the configuration is left untouched.
    #[track_caller]
    pub fn apply_booth_settings(&mut self, settings: &BoothSettings) -> AppResult<()> {
        let mut candidate = self.clone();
        candidate.peripheral.device_identifier = settings
            .device_identifier
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        candidate.booth.record_seconds = settings.record_seconds;
        candidate.booth.countdown_seconds = settings.countdown_seconds;
        candidate.slow_motion.start_seconds = settings.slow_motion_start_seconds;
        candidate.slow_motion.duration_seconds = settings.slow_motion_duration_seconds;
        candidate.slow_motion.multiplier = settings.slow_motion_multiplier;
        candidate.peripheral.arm_command = settings.arm_command.clone();

        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Slow-motion parameters for the editor.
    #[track_caller]
    pub fn slow_motion_spec(&self) -> AppResult<SlowMotionSpec> {
        let seconds = |key: &str, value: f64| {
            Duration::try_from_secs_f64(value).map_err(|e| AppError::ConfigError {
                reason: format!("{key} is out of range: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })
        };

        Ok(SlowMotionSpec::new(
            seconds("slow_motion.start_seconds", self.slow_motion.start_seconds)?,
            seconds("slow_motion.duration_seconds", self.slow_motion.duration_seconds)?,
            self.slow_motion.multiplier,
        )?)
    }

    /// Recording length after which capture stops on its own.
    pub fn record_duration(&self) -> Duration {
        Duration::from_secs(self.booth.record_seconds)
    }

    /// Delay between arming the peripheral and recording.
    pub fn countdown_duration(&self) -> Duration {
        Duration::from_secs(self.booth.countdown_seconds)
    }

    /// Capture settings writing raw files under `dirs`.
    pub fn capture_settings(&self, dirs: &StorageDirs) -> CaptureSettings {
        CaptureSettings {
            position: self.camera.position,
            audio_enabled: self.camera.audio_enabled,
            format: self.camera.format,
            output_dir: dirs.recorded.clone(),
            file_prefix: self.booth.file_prefix.clone(),
        }
    }

    /// Device and tool configuration of the ffmpeg camera backend.
    pub fn ffmpeg_camera(&self) -> FfmpegCameraConfig {
        FfmpegCameraConfig {
            ffmpeg: self.camera.ffmpeg.clone(),
            front_device: self.camera.front_device.clone(),
            back_device: self.camera.back_device.clone(),
            audio_source: self.camera.audio_source.clone(),
            width: self.camera.width,
            height: self.camera.height,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }

    /// Storage layout, rooted at the configured or platform data dir.
    #[track_caller]
    pub fn storage_dirs(&self) -> AppResult<StorageDirs> {
        let root = match &self.storage.data_dir {
            Some(dir) => dir.clone(),
            None => Self::project_dirs()?.data_dir().to_path_buf(),
        };
        Ok(StorageDirs::new(&root))
    }

    /// Get the settings server URL for opening in browser.
    pub fn server_url(&self) -> String {
        format!("http://localhost:{}/api/settings", self.server.port)
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "video-booth", "Video-Booth").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }

    /// Location of `config.toml` in the platform config dir.
    #[track_caller]
    pub fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}
