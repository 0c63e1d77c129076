use crate::{
    AppError, AppResult,
    config::{BoothSettings, Config},
};

use std::{
    net::{Ipv4Addr, SocketAddr},
    panic::Location,
    path::PathBuf,
    sync::Arc,
};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use error_location::ErrorLocation;
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tower_http::cors::CorsLayer;
use tracing::{info, instrument, warn};
use video_booth_core::link::LinkMonitor;

/// Path of the settings resource.
pub const SETTINGS_URI: &str = "/api/settings";

/// Shared state of the settings handlers.
#[derive(Clone)]
pub struct SettingsState {
    pub(crate) config: Arc<Mutex<Config>>,
    pub(crate) config_path: PathBuf,
    pub(crate) link: LinkMonitor,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// `GET`/`PUT` of the booth settings.
pub fn router(state: SettingsState) -> Router {
    Router::new()
        .route(SETTINGS_URI, get(get_settings).put(put_settings))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve [`router`] on `127.0.0.1:port` until `shutdown_rx` flips.
#[instrument(skip(state, shutdown_rx))]
pub async fn serve(
    port: u16,
    state: SettingsState,
    mut shutdown_rx: watch::Receiver<bool>,
) -> AppResult<()> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::ServerError {
            reason: format!("Failed to bind {}: {}", addr, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(addr = %addr, "Settings server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            while !*shutdown_rx.borrow() {
                if shutdown_rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .map_err(|e| AppError::ServerError {
            reason: format!("Settings server failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!("Settings server stopped");
    Ok(())
}

async fn get_settings(State(state): State<SettingsState>) -> Json<BoothSettings> {
    Json(state.config.lock().await.booth_settings())
}

async fn put_settings(
    State(state): State<SettingsState>,
    Json(settings): Json<BoothSettings>,
) -> Response {
    let applied = {
        let mut config = state.config.lock().await;
        let mut candidate = config.clone();

        if let Err(e) = candidate.apply_booth_settings(&settings) {
            warn!(error = %e, "Settings rejected");
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, e);
        }

        if let Err(e) = candidate.save_to(&state.config_path) {
            warn!(error = %e, "Failed to save settings");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e);
        }

        *config = candidate;
        config.booth_settings()
    };

    state
        .link
        .set_saved_identifier(applied.device_identifier.clone())
        .await;

    info!("Settings updated");
    Json(applied).into_response()
}

fn error_response(status: StatusCode, error: AppError) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
        }),
    )
        .into_response()
}
