#![forbid(unsafe_code)]

//! Log subscriber setup.
//!
//! The UI owns the terminal, so logs only go to a file. Without
//! `--log-file` no subscriber is installed and every event is dropped.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the filter directives.
pub const FILTER_ENV: &str = "BEAU_LOG";

const DEFAULT_FILTER: &str = "info";

/// Filter from `directives`, falling back to `info` when absent or invalid.
pub fn filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing to `path`, appending.
///
/// Returns `Ok(false)` when no path is given.
///
/// # Errors
///
/// Fails if the file cannot be opened or a global subscriber is already set.
pub fn init(path: Option<&Path>, json: bool) -> io::Result<bool> {
    let Some(path) = path else {
        return Ok(false);
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let directives = std::env::var(FILTER_ENV).ok();

    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);
    let registry = tracing_subscriber::registry().with(filter(directives.as_deref()));
    let installed = if json {
        registry.with(fmt.json()).try_init()
    } else {
        registry.with(fmt).try_init()
    };
    installed.map_err(io::Error::other)?;

    tracing::info!(path = %path.display(), json, "logging initialized");
    Ok(true)
}
