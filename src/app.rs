use eframe::egui;

use crate::config::Launch;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CovidTrackerApp {
    pub state: AppState,
}

impl CovidTrackerApp {
    /// Prepare the launch file up front. A defaulted path that does not exist
    /// just leaves the viewer empty; an explicit one reports the load error.
    pub fn new(launch: Launch) -> Self {
        let mut state = AppState::new(launch.pipeline);
        if launch.explicit_path || launch.data_path.exists() {
            state.load_path(&launch.data_path);
        } else {
            log::info!(
                "{} not found, waiting for a file to be opened",
                launch.data_path.display()
            );
        }
        Self { state }
    }
}

impl eframe::App for CovidTrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: chart and country controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: latest snapshot table ----
        if self.state.prepared.is_some() {
            egui::TopBottomPanel::bottom("latest_table")
                .resizable(true)
                .default_height(160.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::horizontal().show(ui, |ui| {
                        table::latest_table(ui, &self.state);
                    });
                });
        }

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart(ui, &self.state);
        });
    }
}
