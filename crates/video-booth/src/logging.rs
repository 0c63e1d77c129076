use std::path::Path;

use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "video_booth=debug,video_booth_core=debug";
const LOG_FILE_PREFIX: &str = "video-booth.log";

/// Human-readable logs to stdout plus daily JSON files under `log_dir`.
///
/// `RUST_LOG` overrides the default filter. The returned guard flushes the
/// file writer when dropped and must live until exit.
pub fn init(log_dir: &Path) -> WorkerGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_writer, guard) =
        tracing_appender::non_blocking(rolling::daily(log_dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().json().with_writer(file_writer))
        .init();

    guard
}
