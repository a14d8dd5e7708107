use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file path.
pub const LOG_ENV_VAR: &str = "STATEHOST_LOG";

/// Initialize tracing with optional file output.
///
/// Logging is disabled unless `STATEHOST_LOG` holds a file path. The file
/// name gets a `{timestamp}.{pid}` suffix so concurrent runs don't collide.
/// Verbosity follows `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let Some(unique_path) = log_file_path(std::env::var(LOG_ENV_VAR).ok()) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Ok(file) = std::fs::File::create(&unique_path) else {
        eprintln!("Warning: Failed to create log file: {}", unique_path);
        return;
    };

    let file_layer = fmt::layer()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    // A second call in the same process keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();
}

/// Per-run log file for the configured base path. Unset or blank disables logging.
fn log_file_path(base: Option<String>) -> Option<String> {
    let base = base.filter(|path| !path.trim().is_empty())?;
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Some(format!("{}.{}.{}", base, timestamp, std::process::id()))
}
