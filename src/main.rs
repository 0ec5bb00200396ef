//! Gun Violence Dashboard - US casualties by state, city/county and year
//!
//! Loads the incident CSV, aggregates casualties with Polars and shows
//! interactive bar charts and location maps.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use anyhow::Result;
use clap::Parser;
use config::{Cli, DashboardConfig};
use eframe::egui;
use gui::DashboardApp;

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = DashboardConfig::resolve(&cli)?;
    tracing::info!(?config, "starting dashboard");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Gun Violence Data"),
        ..Default::default()
    };

    eframe::run_native(
        "Gun Violence Data",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run dashboard: {e}"))
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
