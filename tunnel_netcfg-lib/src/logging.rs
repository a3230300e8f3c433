use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_FILTER: &str = "info";
pub const ENV_VAR_LOG_FILE: &str = "TUNNEL_NETCFG_LOG_FILE";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Initializes the global `tracing` subscriber writing to stderr.
///
/// Verbosity comes from `RUST_LOG` and defaults to `info`. Stdout is left to
/// command results.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn setup_stderr() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_ansi(true))
        .with(env_filter())
        .init();
    tracing::debug!("logging initialized with stderr output");
}

/// Initializes the global `tracing` subscriber appending to `log_path`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn setup_log_file(log_path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_path)?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(BoxMakeWriter::new(file)).with_ansi(false))
        .with(env_filter())
        .init();
    tracing::debug!("logging initialized with file output: {}", log_path.display());
    Ok(())
}
