//! Latest-snapshot export for an external choropleth map renderer. The
//! viewer draws no maps itself. It writes one row per country keyed by ISO
//! code for a mapping tool to colour.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::data::model::LatestByCountry;

/// One country in the choropleth table. Missing values are written as 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethRow {
    pub iso_code: String,
    pub location: String,
    pub total_cases: f64,
    pub total_cases_per_million: f64,
    pub people_fully_vaccinated_per_hundred: f64,
}

pub fn choropleth_rows(latest: &LatestByCountry) -> Vec<ChoroplethRow> {
    let zero_if_missing = |v: Option<f64>| v.filter(|x| x.is_finite()).unwrap_or(0.0);
    latest
        .values()
        .map(|r| ChoroplethRow {
            iso_code: r.iso_code.clone().unwrap_or_default(),
            location: r.location.clone(),
            total_cases: zero_if_missing(r.measures.total_cases),
            total_cases_per_million: zero_if_missing(r.measures.total_cases_per_million),
            people_fully_vaccinated_per_hundred: zero_if_missing(
                r.measures.people_fully_vaccinated_per_hundred,
            ),
        })
        .collect()
}

/// Write the choropleth table for `latest`.  Dispatch by extension
/// (`.csv` or `.json`).
pub fn write_choropleth(path: &Path, latest: &LatestByCountry) -> Result<()> {
    let rows = choropleth_rows(latest);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_csv(path, &rows),
        "json" => write_json(path, &rows),
        other => bail!("Unsupported export extension: .{other}"),
    }?;
    log::info!("Wrote {} choropleth rows to {}", rows.len(), path.display());
    Ok(())
}

fn write_csv(path: &Path, rows: &[ChoroplethRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_json(path: &Path, rows: &[ChoroplethRow]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), rows).context("writing JSON")?;
    Ok(())
}
