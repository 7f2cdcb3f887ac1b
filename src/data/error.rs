use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage an error was raised in, for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Schema,
    Parse,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Load => "loading",
            Stage::Schema => "header validation",
            Stage::Parse => "parsing",
        })
    }
}

/// Errors raised while loading and preparing a dataset.
///
/// `Load` and `Schema` abort the run. `Parse` is fatal for numeric cells;
/// a malformed date only excludes its own row (see `clean::normalize_dates`).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot read {}: {}", .path.display(), .source)]
    Load {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("unsupported file extension for {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("required column '{column}' missing from header of {}", .path.display())]
    Schema { path: PathBuf, column: String },

    #[error("line {line}, column '{column}': cannot parse '{value}' as {expected}")]
    Parse {
        line: usize,
        column: String,
        value: String,
        expected: &'static str,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Load { .. } | PipelineError::UnsupportedFormat { .. } => Stage::Load,
            PipelineError::Schema { .. } => Stage::Schema,
            PipelineError::Parse { .. } => Stage::Parse,
        }
    }
}
