use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `MATHADV_LOG=debug`.
pub const LOG_ENV: &str = "MATHADV_LOG";

/// Sends tracing output to `mathadv.log` in `dir`. The terminal is owned by
/// the UI, so nothing is written to stdout or stderr.
pub fn init(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("mathadv.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;
    Ok(())
}
