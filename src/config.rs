use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Data file used when none is given on the command line.
pub const DEFAULT_DATA_FILE: &str = "owid-covid-data.csv";

/// Which countries to keep and which legacy columns to drop.
///
/// Read from JSON; missing keys fall back to the defaults:
///
/// ```json
/// { "countries": ["Kenya", "India"], "legacy_columns": ["SNo"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub countries: BTreeSet<String>,
    pub legacy_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            countries: ["Kenya", "India", "United States"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            legacy_columns: vec!["SNo".to_string(), "Last_Updated_Time".to_string()],
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        if config.countries.is_empty() {
            bail!("config {} selects no countries", path.display());
        }
        Ok(config)
    }
}

/// What the program was started with: `covid-tracker [DATA_FILE [CONFIG_JSON]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Launch {
    pub data_path: PathBuf,
    /// The data path was given explicitly rather than defaulted.
    pub explicit_path: bool,
    pub pipeline: PipelineConfig,
}

impl Launch {
    /// Build from positional arguments (program name already skipped).
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        if let Some(unexpected) = args.get(2) {
            bail!("unexpected argument {:?}", unexpected);
        }
        let data_path = args.first().map(PathBuf::from);
        let pipeline = match args.get(1) {
            Some(config_path) => PipelineConfig::from_json_file(Path::new(config_path))?,
            None => PipelineConfig::default(),
        };

        Ok(Launch {
            explicit_path: data_path.is_some(),
            data_path: data_path.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            pipeline,
        })
    }
}
