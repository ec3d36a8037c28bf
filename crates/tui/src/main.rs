mod app;
mod demo;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use parklot_core::{
    config::{self, AppConfig, RunMode},
    ParkingLot,
};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(config.mode == RunMode::Demo)?;

    let mut lot = ParkingLot::from_config(&config).context("invalid lot configuration")?;
    tracing::info!(
        levels = lot.levels().len(),
        spots = lot.capacity(),
        policy = ?lot.policy(),
        "parking lot ready"
    );

    match config.mode {
        RunMode::Demo => demo::run(&mut lot, config.report_format),
        RunMode::Tui => app::ParklotApp::new(lot).run().await,
    }
}

fn init_logging(to_stdout: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("parklot.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The dashboard owns stdout while it runs.
    let stdout_layer = to_stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
            .with_writer(std::io::stdout)
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
