mod app;
mod color;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use app::PotabilityApp;
use eframe::egui;
use water_potability::config::AppConfig;
use water_potability::ArtifactStore;

fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::from_env()?;

    // Artifacts are loaded exactly once; without them there is nothing to serve.
    let store = match ArtifactStore::load(&config.artifacts) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("{e}");
            return Err(e.into());
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Water Potability Prediction",
        options,
        Box::new(move |_cc| Ok(Box::new(PotabilityApp::new(store, &config)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
