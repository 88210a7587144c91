//! hyprwhspr-shortcutd: D-Bus trigger daemon for hyprwhspr dictation
//!
//! Publishes `com.hyprwhspr.Dictation` on the session bus so a compositor
//! keybinding (e.g. Hyprland `bind = ..., exec, gdbus call ...`) can start
//! dictation in the running process. The daemon never captures keys itself;
//! the key-to-trigger binding lives entirely in compositor configuration.

mod config;
mod lifecycle;
mod shortcuts;

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::lifecycle::ShutdownSignal;
use crate::shortcuts::{ShortcutController, BUS_NAME, OBJECT_PATH};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "hyprwhspr-shortcutd starting"
    );

    let config = Config::load()?;
    info!(key = %config.primary_key, "configuration loaded");

    let shutdown = ShutdownSignal::new();

    // The real dictation pipeline hangs off this handler; the daemon only
    // logs the dispatch.
    let controller = ShortcutController::new(
        &config.primary_key,
        Some(Arc::new(|| info!("dictation trigger dispatched"))),
        config.device_path.as_deref(),
    );

    if controller.start() {
        info!(
            "test with: gdbus call --session --dest {BUS_NAME} \
             --object-path {OBJECT_PATH} --method {BUS_NAME}.Trigger"
        );
    } else {
        error!("failed to start global shortcuts");
        warn!("continuing with the trigger endpoint inert");
    }

    info!(
        status = %serde_json::to_string(&controller.status())?,
        "daemon initialized"
    );

    shutdown.wait().await;
    info!("shutdown signal received");

    controller.stop();
    info!("hyprwhspr-shortcutd stopped");

    Ok(())
}
