//! Tracing setup
//!
//! The interactive view owns the terminal, so it logs to a file. One-shot
//! commands log to stderr.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter(debug: bool, quiet_default: &str) -> EnvFilter {
    let default_filter = if debug {
        "debug,hyper=info,reqwest=info"
    } else {
        quiet_default
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

pub fn log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("trendspotter")
        .join("trendspotter.log")
}

/// Append logs to [`log_path`] and return where they go.
pub fn init_file(debug: bool) -> Result<PathBuf> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(filter(debug, "info"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    Ok(path)
}

pub fn init_stderr(debug: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter(debug, "warn"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}
