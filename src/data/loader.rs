use std::collections::BTreeMap;
use std::path::Path;

use super::error::PipelineError;
use super::model::{Measures, NumericField, RawRecord, RawTable};

/// Columns that must be present in the header.
pub const REQUIRED_COLUMNS: [&str; 4] = ["location", "date", "total_cases", "total_deaths"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a delimited text file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`          – comma separated (the OWID download)
/// * `.tsv` / `.tab` / `.txt` – tab separated
pub fn load_file(path: &Path) -> Result<RawTable, PipelineError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_delimited(path, b','),
        "tsv" | "tab" | "txt" => load_delimited(path, b'\t'),
        _ => Err(PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Column positions resolved once from the header.
struct HeaderIndex {
    location: usize,
    date: usize,
    iso_code: Option<usize>,
    continent: Option<usize>,
    numeric: Vec<(NumericField, usize)>,
    extra: Vec<(usize, String)>,
}

impl HeaderIndex {
    fn resolve(path: &Path, headers: &[String]) -> Result<Self, PipelineError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        for column in REQUIRED_COLUMNS {
            if find(column).is_none() {
                return Err(PipelineError::Schema {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                });
            }
        }

        let numeric: Vec<(NumericField, usize)> = NumericField::ALL
            .iter()
            .filter_map(|&field| find(field.column()).map(|idx| (field, idx)))
            .collect();

        let known = |h: &str| {
            h == "location"
                || h == "date"
                || h == "iso_code"
                || h == "continent"
                || NumericField::ALL.iter().any(|f| f.column() == h)
        };
        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !known(h))
            .map(|(i, h)| (i, h.clone()))
            .collect();

        Ok(HeaderIndex {
            // Presence checked above.
            location: find("location").unwrap_or_default(),
            date: find("date").unwrap_or_default(),
            iso_code: find("iso_code"),
            continent: find("continent"),
            numeric,
            extra,
        })
    }
}

/// Layout: header row with column names, one observation per row.
/// `location`, `date`, `total_cases` and `total_deaths` are required; the
/// other declared columns are read when present. Unknown columns are kept
/// as text in `RawRecord::extra`.
fn load_delimited(path: &Path, delimiter: u8) -> Result<RawTable, PipelineError> {
    let load_err = |source| PipelineError::Load {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(load_err)?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(load_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let index = HeaderIndex::resolve(path, &columns)?;
    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.map_err(load_err)?;
        // Header is line 1.
        let line = row_no + 2;

        let text = |idx: usize| non_empty(row.get(idx).unwrap_or(""));

        let mut measures = Measures::default();
        for &(field, idx) in &index.numeric {
            let value = parse_number(row.get(idx).unwrap_or(""), line, field.column())?;
            measures.set(field, value);
        }

        let mut extra = BTreeMap::new();
        for (idx, name) in &index.extra {
            if let Some(value) = text(*idx) {
                extra.insert(name.clone(), value);
            }
        }

        records.push(RawRecord {
            location: text(index.location),
            date: text(index.date),
            iso_code: index.iso_code.and_then(text),
            continent: index.continent.and_then(text),
            measures,
            extra,
        });
    }

    log::debug!(
        "Read {} rows with {} columns from {}",
        records.len(),
        columns.len(),
        path.display()
    );

    Ok(RawTable { columns, records })
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Empty cells and NaN / infinity literals are null.
fn parse_number(s: &str, line: usize, column: &str) -> Result<Option<f64>, PipelineError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Ok(None),
        Err(_) => Err(PipelineError::Parse {
            line,
            column: column.to_string(),
            value: s.to_string(),
            expected: "a number",
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::error::Stage;

    fn write_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_declared_and_extra_columns() {
        let file = write_file(
            ".csv",
            "iso_code,continent,location,date,total_cases,total_deaths,new_cases,\
             SNo,stringency_index\n\
             KEN,Africa,Kenya,2021-01-01,10,1,,3,41.2\n\
             OWID_WRL,,World,2021-01-01,100,5,7,,\n",
        );
        let table = load_file(file.path()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns[0], "iso_code");
        let kenya = &table.records[0];
        assert_eq!(kenya.location.as_deref(), Some("Kenya"));
        assert_eq!(kenya.date.as_deref(), Some("2021-01-01"));
        assert_eq!(kenya.measures.total_cases, Some(10.0));
        assert_eq!(kenya.measures.new_cases, None);
        assert_eq!(kenya.measures.total_vaccinations, None);
        assert_eq!(kenya.extra.get("SNo").map(String::as_str), Some("3"));
        assert_eq!(kenya.extra.get("stringency_index").map(String::as_str), Some("41.2"));

        let world = &table.records[1];
        assert_eq!(world.continent, None);
        assert!(world.extra.is_empty());
    }

    #[test]
    fn tab_separated_files_are_supported() {
        let contents = "location\tdate\ttotal_cases\ttotal_deaths\nIndia\t2021-02-01\t5\t0\n";
        for suffix in [".tsv", ".tab", ".txt"] {
            let file = write_file(suffix, contents);
            let table = load_file(file.path()).unwrap();
            assert_eq!(table.records[0].location.as_deref(), Some("India"), "{suffix}");
            assert_eq!(table.records[0].measures.total_cases, Some(5.0), "{suffix}");
        }
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let file = write_file(".csv", "location,date,total_cases\nKenya,2021-01-01,1\n");
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(err.stage(), Stage::Schema);
        assert!(matches!(
            err,
            PipelineError::Schema { ref column, .. } if column == "total_deaths"
        ));
    }

    #[test]
    fn malformed_number_is_parse_error_with_position() {
        let file = write_file(
            ".csv",
            "location,date,total_cases,total_deaths\n\
             Kenya,2021-01-01,1,0\n\
             Kenya,2021-01-02,ten,0\n",
        );
        let err = load_file(file.path()).unwrap_err();
        match err {
            PipelineError::Parse { line, column, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "total_cases");
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nan_literal_reads_as_null() {
        let file = write_file(
            ".csv",
            "location,date,total_cases,total_deaths\nKenya,2021-01-01,NaN,0\n",
        );
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.records[0].measures.total_cases, None);
    }

    #[test]
    fn missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.csv")).unwrap_err();
        assert_eq!(err.stage(), Stage::Load);
        assert!(matches!(err, PipelineError::Load { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_file(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }
}
