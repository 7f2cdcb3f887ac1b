use std::path::Path;

use super::clean;
use super::error::PipelineError;
use super::loader;
use super::model::{Dataset, PrepareReport, Prepared, RawTable};
use super::views;
use crate::config::PipelineConfig;

/// Run the cleaning stages over a loaded table and build the per-country
/// views. Never fails: rows that cannot be used are dropped and counted.
pub fn prepare(mut table: RawTable, config: &PipelineConfig) -> Prepared {
    let mut report = PrepareReport {
        input_rows: table.len(),
        ..PrepareReport::default()
    };

    let records = std::mem::take(&mut table.records);
    table.records = clean::filter_countries(records, &config.countries);
    report.kept_by_country = table.len();
    log::info!(
        "Country filter kept {} of {} rows",
        report.kept_by_country,
        report.input_rows
    );

    report.pruned_columns = clean::prune_columns(&mut table, &config.legacy_columns);
    if !report.pruned_columns.is_empty() {
        log::debug!("Pruned legacy columns {:?}", report.pruned_columns);
    }

    let (rows, missing) = clean::prune_rows(table.records);
    report.missing_critical = missing;
    log::debug!("Dropped {missing} rows missing date, total_cases or total_deaths");

    let (mut records, bad_dates) = clean::normalize_dates(rows);
    report.bad_dates = bad_dates;

    clean::fill_gaps(&mut records);
    clean::derive_death_rate(&mut records);

    let dataset = Dataset {
        columns: table.columns,
        records,
    };

    let (countries_only, aggregates) = views::without_aggregates(&dataset.records);
    report.aggregates_excluded = aggregates;
    let series = views::time_series(countries_only.iter().copied());
    let latest = views::latest_by_country(countries_only);
    report.output_rows = dataset.len();

    log::info!("Prepared dataset: {report}");

    Prepared {
        dataset,
        latest,
        series,
        report,
    }
}

/// Load `path` and prepare it. Load, schema and numeric parse errors abort
/// before anything is produced.
pub fn load_and_prepare(path: &Path, config: &PipelineConfig) -> Result<Prepared, PipelineError> {
    let table = loader::load_file(path)?;
    log::info!("Loaded {} rows from {}", table.len(), path.display());
    Ok(prepare(table, config))
}
