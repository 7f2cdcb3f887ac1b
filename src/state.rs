use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::color::CountryColors;
use crate::config::PipelineConfig;
use crate::data::model::{Metric, NumericField, Prepared, Record};
use crate::data::pipeline::load_and_prepare;
use crate::data::stats::{CORRELATION_METRICS, CorrelationMatrix, correlation_matrix};
use crate::export::write_choropleth;

// ---------------------------------------------------------------------------
// Chart selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    TotalCases,
    TotalDeaths,
    NewCases,
    TotalVaccinations,
    DeathRate,
    LatestCases,
    FullyVaccinated,
    Correlation,
}

impl ChartKind {
    pub const ALL: [ChartKind; 8] = [
        ChartKind::TotalCases,
        ChartKind::TotalDeaths,
        ChartKind::NewCases,
        ChartKind::TotalVaccinations,
        ChartKind::DeathRate,
        ChartKind::LatestCases,
        ChartKind::FullyVaccinated,
        ChartKind::Correlation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::TotalCases => "Total COVID-19 Cases Over Time",
            ChartKind::TotalDeaths => "Total COVID-19 Deaths Over Time",
            ChartKind::NewCases => "Daily New COVID-19 Cases",
            ChartKind::TotalVaccinations => "Cumulative COVID-19 Vaccinations Over Time",
            ChartKind::DeathRate => "Death Rate Over Time",
            ChartKind::LatestCases => "Total Confirmed Cases (Latest Data)",
            ChartKind::FullyVaccinated => "Percentage of Population Fully Vaccinated",
            ChartKind::Correlation => "Correlation Heatmap",
        }
    }

    /// The metric plotted against time, for line charts.
    pub fn line_metric(self) -> Option<Metric> {
        match self {
            ChartKind::TotalCases => Some(Metric::Measure(NumericField::TotalCases)),
            ChartKind::TotalDeaths => Some(Metric::Measure(NumericField::TotalDeaths)),
            ChartKind::NewCases => Some(Metric::Measure(NumericField::NewCases)),
            ChartKind::TotalVaccinations => Some(Metric::Measure(NumericField::TotalVaccinations)),
            ChartKind::DeathRate => Some(Metric::DeathRate),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Country set and legacy columns used when a file is prepared.
    pub config: PipelineConfig,

    /// File the current data came from.
    pub source: Option<PathBuf>,

    /// Prepared data (None until a file loads successfully).
    pub prepared: Option<Prepared>,

    /// Chart shown in the central panel.
    pub chart: ChartKind,

    /// Countries toggled off in the legend.
    pub hidden: BTreeSet<String>,

    /// One colour per country.
    pub colors: Option<CountryColors>,

    /// Inclusive date window for the time-series charts.
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,

    /// Cached correlation over every prepared country row.
    pub correlation: Option<CorrelationMatrix>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            source: None,
            prepared: None,
            chart: ChartKind::TotalCases,
            hidden: BTreeSet::new(),
            colors: None,
            date_from: None,
            date_to: None,
            correlation: None,
            status_message: None,
        }
    }

    /// Load and prepare `path`. On failure the previous data stays in place
    /// and the error is reported in the status line.
    pub fn load_path(&mut self, path: &Path) {
        match load_and_prepare(path, &self.config) {
            Ok(prepared) => {
                log::info!(
                    "Prepared {} countries from {}",
                    prepared.series.len(),
                    path.display()
                );
                self.set_prepared(prepared, Some(path.to_path_buf()));
            }
            Err(e) => {
                log::error!("Failed during {}: {e}", e.stage());
                self.status_message = Some(format!("Error during {}: {e}", e.stage()));
            }
        }
    }

    /// Ingest newly prepared data, reset colours, date window and toggles.
    pub fn set_prepared(&mut self, prepared: Prepared, source: Option<PathBuf>) {
        self.colors = Some(CountryColors::new(prepared.series.keys()));

        let dates = prepared.series.values().flatten().map(|r| r.date);
        self.date_from = dates.clone().min();
        self.date_to = dates.max();

        self.correlation = Some(correlation_matrix(
            prepared.series.values().flatten(),
            &CORRELATION_METRICS,
        ));

        self.hidden.clear();
        self.prepared = Some(prepared);
        self.source = source;
        self.status_message = None;
    }

    pub fn is_visible(&self, location: &str) -> bool {
        !self.hidden.contains(location)
    }

    /// Show / hide one country in every chart.
    pub fn toggle_country(&mut self, location: &str) {
        if !self.hidden.remove(location) {
            self.hidden.insert(location.to_string());
        }
    }

    /// Visible countries with their rows clipped to the date window.
    pub fn visible_series(&self) -> Vec<(&str, &[Record])> {
        let Some(prepared) = &self.prepared else {
            return Vec::new();
        };
        prepared
            .series
            .iter()
            .filter(|(location, _)| self.is_visible(location))
            .map(|(location, rows)| {
                // Rows are date-sorted, so the window is a contiguous slice.
                let start = match self.date_from {
                    Some(from) => rows.partition_point(|r| r.date < from),
                    None => 0,
                };
                let end = match self.date_to {
                    Some(to) => rows.partition_point(|r| r.date <= to),
                    None => rows.len(),
                };
                (location.as_str(), &rows[start..end.max(start)])
            })
            .collect()
    }

    /// Latest records of the visible countries.
    pub fn visible_latest(&self) -> Vec<&Record> {
        self.prepared
            .iter()
            .flat_map(|p| p.latest.values())
            .filter(|r| self.is_visible(&r.location))
            .collect()
    }

    /// Restore the full date window.
    pub fn reset_date_range(&mut self) {
        if let Some(prepared) = &self.prepared {
            let dates = prepared.series.values().flatten().map(|r| r.date);
            self.date_from = dates.clone().min();
            self.date_to = dates.max();
        }
    }

    pub fn export_choropleth(&self, path: &Path) -> Result<()> {
        let prepared = self.prepared.as_ref().context("no dataset loaded")?;
        write_choropleth(path, &prepared.latest)
    }
}
