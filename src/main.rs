// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use leukocoria_api::{
    api::{start_server, AppState},
    cli::Cli,
    version,
    vision::DetectorSet,
};
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("🚀 Starting {}", version::get_version_string());

    let cli = Cli::parse();
    let config = cli.load_config()?;

    info!(
        "Detector models (face: {:?}, eye: {:?})",
        config.detector.face_model_path, config.detector.eye_model_path
    );
    let detectors = DetectorSet::load(&config.detector).context("loading detector models")?;
    let (face, eye) = detectors.backend_names();
    info!("✅ Detectors ready (face: {}, eye: {})", face, eye);

    if config.mock.enabled {
        info!("Mock surface enabled (seed: {:?})", config.mock.seed);
    }

    let state = AppState::new(config, detectors).context("building application state")?;
    start_server(Arc::new(state)).await
}
