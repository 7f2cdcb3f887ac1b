use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints};

use crate::color::correlation_color;
use crate::data::model::{Metric, NumericField};
use crate::data::stats::rank_by_total_cases;
use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Central panel – dispatch on the selected chart
// ---------------------------------------------------------------------------

/// Render the selected chart in the central panel.
pub fn chart(ui: &mut Ui, state: &AppState) {
    if state.prepared.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to view charts  (File → Open…)");
        });
        return;
    }

    ui.heading(state.chart.title());
    match state.chart {
        ChartKind::LatestCases => latest_bar_chart(ui, state, NumericField::TotalCases, true),
        ChartKind::FullyVaccinated => latest_bar_chart(
            ui,
            state,
            NumericField::PeopleFullyVaccinatedPerHundred,
            false,
        ),
        ChartKind::Correlation => correlation_heatmap(ui, state),
        kind => {
            if let Some(metric) = kind.line_metric() {
                time_series_plot(ui, state, metric);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Line charts over time
// ---------------------------------------------------------------------------

/// Plot x coordinate for a date.
fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn format_day(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn time_series_plot(ui: &mut Ui, state: &AppState, metric: Metric) {
    Plot::new(("time_series", metric.to_string()))
        .legend(Legend::default())
        .x_axis_label("Date")
        .y_axis_label(metric.label())
        .x_axis_formatter(format_day)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (location, rows) in state.visible_series() {
                let color = state
                    .colors
                    .as_ref()
                    .map(|c| c.color_for(location))
                    .unwrap_or(Color32::LIGHT_BLUE);

                // Undefined values (NaN death rate, never-reported fields)
                // are left out of the line.
                let points: PlotPoints = rows
                    .iter()
                    .filter_map(|r| {
                        let y = r.metric(metric).filter(|v| v.is_finite())?;
                        Some([day_number(r.date), y])
                    })
                    .collect();

                let line = Line::new(points).name(location).color(color).width(1.5);
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Bar charts over the latest snapshot
// ---------------------------------------------------------------------------

fn latest_bar_chart(ui: &mut Ui, state: &AppState, field: NumericField, ranked: bool) {
    let Some(prepared) = &state.prepared else {
        return;
    };

    let records: Vec<_> = if ranked {
        rank_by_total_cases(&prepared.latest)
            .into_iter()
            .filter(|r| state.is_visible(&r.location))
            .collect()
    } else {
        state.visible_latest()
    };

    let names: Vec<String> = records.iter().map(|r| r.location.clone()).collect();
    let bars: Vec<Bar> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let color = state
                .colors
                .as_ref()
                .map(|c| c.color_for(&r.location))
                .unwrap_or(Color32::LIGHT_BLUE);
            Bar::new(i as f64, r.value(field).unwrap_or(0.0))
                .name(&r.location)
                .fill(color)
                .width(0.6)
        })
        .collect();

    Plot::new(("latest_bars", field.column()))
        .x_axis_label("Country")
        .y_axis_label(field.label())
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            names.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(field.label()));
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn correlation_heatmap(ui: &mut Ui, state: &AppState) {
    let Some(matrix) = &state.correlation else {
        return;
    };

    egui::Grid::new("correlation_grid")
        .spacing([6.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for metric in &matrix.metrics {
                ui.strong(metric.to_string());
            }
            ui.end_row();

            for (i, row_metric) in matrix.metrics.iter().enumerate() {
                ui.strong(row_metric.to_string());
                for j in 0..matrix.metrics.len() {
                    let value = matrix.get(i, j);
                    let text = if value.is_finite() {
                        format!("{value:.2}")
                    } else {
                        "n/a".to_string()
                    };
                    ui.label(
                        RichText::new(text)
                            .monospace()
                            .color(Color32::WHITE)
                            .background_color(correlation_color(value)),
                    );
                }
                ui.end_row();
            }
        });
}
