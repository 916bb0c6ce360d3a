use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the file named by `FORMSET_TUI_LOG`; stdout belongs to the TUI.
///
/// Without the variable no subscriber is installed and events are dropped.
pub fn init() -> Result<()> {
    let Ok(path) = std::env::var("FORMSET_TUI_LOG") else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {path}"))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();
    tracing::info!(log = %path, "logging initialized");
    Ok(())
}
