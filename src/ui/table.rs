use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::NumericField;
use crate::state::AppState;

const COLUMNS: [NumericField; 5] = [
    NumericField::TotalCases,
    NumericField::TotalDeaths,
    NumericField::TotalVaccinations,
    NumericField::PeopleFullyVaccinatedPerHundred,
    NumericField::TotalCasesPerMillion,
];

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            if v.fract() == 0.0 {
                format!("{v:.0}")
            } else {
                format!("{v:.2}")
            }
        }
        _ => "–".to_string(),
    }
}

/// Latest snapshot per visible country.
pub fn latest_table(ui: &mut Ui, state: &AppState) {
    let rows = state.visible_latest();
    if rows.is_empty() {
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(120.0))
        .column(Column::auto())
        .columns(Column::auto().at_least(90.0), COLUMNS.len() + 1)
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Country");
            });
            header.col(|ui| {
                ui.strong("Date");
            });
            for field in COLUMNS {
                header.col(|ui| {
                    ui.strong(field.label());
                });
            }
            header.col(|ui| {
                ui.strong("Death rate");
            });
        })
        .body(|mut body| {
            for r in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&r.location);
                    });
                    row.col(|ui| {
                        ui.label(r.date.to_string());
                    });
                    for field in COLUMNS {
                        row.col(|ui| {
                            ui.label(format_value(r.value(field)));
                        });
                    }
                    row.col(|ui| {
                        let rate = r.death_rate;
                        if rate.is_finite() {
                            ui.label(format!("{:.2}%", rate * 100.0));
                        } else {
                            ui.label("undefined");
                        }
                    });
                });
            }
        });
}
