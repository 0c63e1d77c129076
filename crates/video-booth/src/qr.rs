use crate::{AppError, AppResult};

use std::{
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use image::Luma;
use qrcode::{EcLevel, QrCode};
use tracing::{info, instrument};

const MODULE_PIXELS: u32 = 10;

/// Where the QR code of `edited` is written.
pub fn qr_path_for(edited: &Path) -> PathBuf {
    edited.with_extension("png")
}

/// Render `payload` as a high-redundancy QR PNG at `output`.
#[track_caller]
#[instrument(skip(payload))]
pub fn write_qr_png(payload: &str, output: &Path) -> AppResult<()> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H).map_err(
        |e| AppError::QrError {
            reason: format!("Failed to encode QR payload: {}", e),
            location: ErrorLocation::from(Location::caller()),
        },
    )?;

    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .build();

    image.save(output).map_err(|e| AppError::QrError {
        reason: format!("Failed to write {}: {}", output.display(), e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!(width = image.width(), "QR code written");
    Ok(())
}
