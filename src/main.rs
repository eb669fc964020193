mod app;
mod color;
mod config;
mod data;
mod insight;
mod state;
mod ui;
mod viz;

use anyhow::Context;
use app::BankInsightsApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load()?;
    let options = config.load_options()?;

    // The dataset is loaded exactly once; a failure aborts before any window opens.
    let dataset = data::loader::load_file(&config.data_path, &options)
        .inspect_err(|e| log::error!("Failed to load dataset: {e}"))
        .with_context(|| format!("loading {}", config.data_path.display()))?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    let state = AppState::new(dataset, config);
    eframe::run_native(
        "Bank Customer Insights",
        native_options,
        Box::new(|_cc| Ok(Box::new(BankInsightsApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
