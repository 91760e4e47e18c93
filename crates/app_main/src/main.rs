//! ImageDeck - console client for the image management server
//!
//! Main entry point.

mod app;
mod console;

use anyhow::Result;
use tokio::task::LocalSet;

fn main() -> Result<()> {
    // Initialize logging and panic hook first
    app_log::init()?;

    // Clean up old logs (7 days)
    if let Err(e) = app_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("ImageDeck starting...");

    // Load configuration
    let config = app_core::AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration, using defaults: {}", e);
        app_core::AppConfig::default()
    });

    // Every controller task lives on this one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = LocalSet::new().block_on(&runtime, app::run(config));

    // The stdin reader sits in a blocking read; don't wait for it
    runtime.shutdown_background();
    result
}
