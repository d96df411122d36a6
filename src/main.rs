// Main entry point for the WebTV terminal player
// Sets up logging and configuration, then hands over to the TUI

mod ui;

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ui::app::PlayerApp;
use webtv_player::config::AppConfig;

const LOG_ENV: &str = "WEBTV_PLAYER_LOG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::load().context("failed to load configuration")?;

    let mut app = PlayerApp::new(config)?;

    // Run the TUI event loop
    app.run().await?;

    Ok(())
}

// The terminal belongs to the TUI, so logs go to a file. Without a writable
// data directory logging stays off.
fn init_logging() {
    let Some(path) = AppConfig::log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        if fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("webtv_player=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}
