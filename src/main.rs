mod app;
mod color;
mod config;
mod data;
mod export;
mod state;
mod ui;

use app::CovidTrackerApp;
use config::Launch;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let launch = Launch::from_args(std::env::args_os().skip(1))?;
    log::info!(
        "Tracking {} countries: {:?}",
        launch.pipeline.countries.len(),
        launch.pipeline.countries
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "COVID-19 Tracker",
        options,
        Box::new(move |_cc| Ok(Box::new(CovidTrackerApp::new(launch)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
