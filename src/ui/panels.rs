use eframe::egui::{self, Color32, ProgressBar, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::stats::{finite_summary, vaccination_share};
use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Left side panel – chart choice, date window, countries
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Charts");
    ui.separator();

    if state.prepared.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Chart selector ----
            ui.strong("Show");
            egui::ComboBox::from_id_salt("chart_kind")
                .selected_text(state.chart.title())
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for kind in ChartKind::ALL {
                        ui.selectable_value(&mut state.chart, kind, kind.title());
                    }
                });
            ui.separator();

            date_window(ui, state);
            ui.separator();

            countries(ui, state);
            ui.separator();

            if let Some(prepared) = &state.prepared {
                egui::CollapsingHeader::new(RichText::new("Pipeline report").strong())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.label(prepared.report.to_string());
                        let rates = prepared.series.values().flatten().map(|r| r.death_rate);
                        match finite_summary(rates) {
                            Some(s) => ui.label(format!(
                                "Death rate over {} defined rows: \
                                 mean {:.2}%, range {:.2}–{:.2}%",
                                s.count,
                                s.mean * 100.0,
                                s.min * 100.0,
                                s.max * 100.0
                            )),
                            None => ui.label("Death rate undefined for every row"),
                        };
                        if !prepared.report.pruned_columns.is_empty() {
                            ui.label(format!(
                                "Pruned columns: {}",
                                prepared.report.pruned_columns.join(", ")
                            ));
                        }
                    });
            }
        });
}

fn date_window(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Date range");
    let (Some(mut from), Some(mut to)) = (state.date_from, state.date_to) else {
        return;
    };
    egui::Grid::new("date_window").show(ui, |ui: &mut Ui| {
        ui.label("From");
        ui.add(DatePickerButton::new(&mut from).id_salt("date_from"));
        ui.end_row();
        ui.label("To");
        ui.add(DatePickerButton::new(&mut to).id_salt("date_to"));
        ui.end_row();
    });
    state.date_from = Some(from);
    state.date_to = Some(to);

    if ui.small_button("Full range").clicked() {
        state.reset_date_range();
    }
}

/// Colour legend with visibility toggles and vaccination share per country.
fn countries(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Countries");

    let latest: Vec<_> = match &state.prepared {
        Some(p) => p
            .latest
            .iter()
            .map(|(location, r)| (location.clone(), vaccination_share(r)))
            .collect(),
        None => return,
    };

    for (location, share) in latest {
        let mut text = RichText::new(&location);
        if let Some(colors) = &state.colors {
            text = text.color(colors.color_for(&location));
        }

        let mut checked = state.is_visible(&location);
        if ui.checkbox(&mut checked, text).changed() {
            state.toggle_country(&location);
        }

        match share {
            Some((vaccinated, unvaccinated)) => {
                ui.add(
                    ProgressBar::new((vaccinated / 100.0) as f32)
                        .text(format!("{vaccinated:.1}% vaccinated, {unvaccinated:.1}% not")),
                );
            }
            None => {
                ui.label(RichText::new("vaccination data unavailable").weak());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.prepared.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export choropleth…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(p) = &state.prepared {
            ui.label(format!(
                "{} rows, {} countries",
                p.dataset.len(),
                p.series.len()
            ));
            if let Some(source) = &state.source {
                ui.label(RichText::new(source.display().to_string()).weak());
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open COVID-19 dataset")
        .add_filter("Supported files", &["csv", "tsv", "tab", "txt"])
        .add_filter("CSV", &["csv"])
        .add_filter("Tab separated", &["tsv", "tab", "txt"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export choropleth data")
        .set_file_name("choropleth_latest.csv")
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match state.export_choropleth(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export choropleth data: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}
