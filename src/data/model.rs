use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// NumericField – the declared numeric columns
// ---------------------------------------------------------------------------

/// The numeric columns the pipeline knows about and gap-fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericField {
    TotalCases,
    TotalDeaths,
    NewCases,
    NewDeaths,
    TotalVaccinations,
    PeopleFullyVaccinatedPerHundred,
    TotalCasesPerMillion,
}

impl NumericField {
    pub const ALL: [NumericField; 7] = [
        NumericField::TotalCases,
        NumericField::TotalDeaths,
        NumericField::NewCases,
        NumericField::NewDeaths,
        NumericField::TotalVaccinations,
        NumericField::PeopleFullyVaccinatedPerHundred,
        NumericField::TotalCasesPerMillion,
    ];

    /// Column name in the source file header.
    pub fn column(self) -> &'static str {
        match self {
            NumericField::TotalCases => "total_cases",
            NumericField::TotalDeaths => "total_deaths",
            NumericField::NewCases => "new_cases",
            NumericField::NewDeaths => "new_deaths",
            NumericField::TotalVaccinations => "total_vaccinations",
            NumericField::PeopleFullyVaccinatedPerHundred => "people_fully_vaccinated_per_hundred",
            NumericField::TotalCasesPerMillion => "total_cases_per_million",
        }
    }

    /// Human-readable label for axes and legends.
    pub fn label(self) -> &'static str {
        match self {
            NumericField::TotalCases => "Total cases",
            NumericField::TotalDeaths => "Total deaths",
            NumericField::NewCases => "New cases",
            NumericField::NewDeaths => "New deaths",
            NumericField::TotalVaccinations => "Total vaccinations",
            NumericField::PeopleFullyVaccinatedPerHundred => "% fully vaccinated",
            NumericField::TotalCasesPerMillion => "Cases per million",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Metric – anything chartable: a declared field or the derived death rate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Measure(NumericField),
    DeathRate,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::Measure(field) => field.label(),
            Metric::DeathRate => "Death rate",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Measure(field) => write!(f, "{field}"),
            Metric::DeathRate => f.write_str("death_rate"),
        }
    }
}

// ---------------------------------------------------------------------------
// Measures – the nullable numeric cells of one row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measures {
    pub total_cases: Option<f64>,
    pub total_deaths: Option<f64>,
    pub new_cases: Option<f64>,
    pub new_deaths: Option<f64>,
    pub total_vaccinations: Option<f64>,
    pub people_fully_vaccinated_per_hundred: Option<f64>,
    pub total_cases_per_million: Option<f64>,
}

impl Measures {
    pub fn get(&self, field: NumericField) -> Option<f64> {
        *self.slot(field)
    }

    pub fn set(&mut self, field: NumericField, value: Option<f64>) {
        *self.slot_mut(field) = value;
    }

    fn slot(&self, field: NumericField) -> &Option<f64> {
        match field {
            NumericField::TotalCases => &self.total_cases,
            NumericField::TotalDeaths => &self.total_deaths,
            NumericField::NewCases => &self.new_cases,
            NumericField::NewDeaths => &self.new_deaths,
            NumericField::TotalVaccinations => &self.total_vaccinations,
            NumericField::PeopleFullyVaccinatedPerHundred => {
                &self.people_fully_vaccinated_per_hundred
            }
            NumericField::TotalCasesPerMillion => &self.total_cases_per_million,
        }
    }

    fn slot_mut(&mut self, field: NumericField) -> &mut Option<f64> {
        match field {
            NumericField::TotalCases => &mut self.total_cases,
            NumericField::TotalDeaths => &mut self.total_deaths,
            NumericField::NewCases => &mut self.new_cases,
            NumericField::NewDeaths => &mut self.new_deaths,
            NumericField::TotalVaccinations => &mut self.total_vaccinations,
            NumericField::PeopleFullyVaccinatedPerHundred => {
                &mut self.people_fully_vaccinated_per_hundred
            }
            NumericField::TotalCasesPerMillion => &mut self.total_cases_per_million,
        }
    }
}

// ---------------------------------------------------------------------------
// RawRecord / RawTable – what the loader hands to the pipeline
// ---------------------------------------------------------------------------

/// One row as read from the source file, before any cleaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub location: Option<String>,
    /// Unparsed date text.
    pub date: Option<String>,
    pub iso_code: Option<String>,
    pub continent: Option<String>,
    pub measures: Measures,
    /// Columns outside the declared set: column_name → non-empty cell text.
    pub extra: BTreeMap<String, String>,
}

/// The loaded file: header order plus rows in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Record – one cleaned (country, date) observation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub location: String,
    pub date: NaiveDate,
    pub iso_code: Option<String>,
    pub continent: Option<String>,
    pub measures: Measures,
    /// `total_deaths / total_cases`; NaN when undefined (zero cases).
    pub death_rate: f64,
    pub extra: BTreeMap<String, String>,
}

impl Record {
    pub fn value(&self, field: NumericField) -> Option<f64> {
        self.measures.get(field)
    }

    /// Chartable value. The death rate is always present but may be NaN.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Measure(field) => self.value(field),
            Metric::DeathRate => Some(self.death_rate),
        }
    }

    /// Region / world rollups carry no continent.
    pub fn is_aggregate(&self) -> bool {
        self.continent
            .as_deref()
            .map_or(true, |c| c.trim().is_empty())
    }
}

impl From<Record> for RawRecord {
    fn from(record: Record) -> Self {
        RawRecord {
            location: Some(record.location),
            date: Some(record.date.format("%Y-%m-%d").to_string()),
            iso_code: record.iso_code,
            continent: record.continent,
            measures: record.measures,
            extra: record.extra,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset and derived views
// ---------------------------------------------------------------------------

/// The cleaned table, in original row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Dataset> for RawTable {
    fn from(dataset: Dataset) -> Self {
        RawTable {
            columns: dataset.columns,
            records: dataset.records.into_iter().map(RawRecord::from).collect(),
        }
    }
}

/// location → most recent record.
pub type LatestByCountry = BTreeMap<String, Record>;

/// location → all records, date ascending.
pub type TimeSeries = BTreeMap<String, Vec<Record>>;

/// Row counts collected while preparing a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareReport {
    pub input_rows: usize,
    pub kept_by_country: usize,
    pub pruned_columns: Vec<String>,
    pub missing_critical: usize,
    pub bad_dates: usize,
    pub aggregates_excluded: usize,
    pub output_rows: usize,
}

impl fmt::Display for PrepareReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows read, {} in selected countries, {} missing critical values, \
             {} bad dates, {} kept ({} aggregate rows hidden)",
            self.input_rows,
            self.kept_by_country,
            self.missing_critical,
            self.bad_dates,
            self.output_rows,
            self.aggregates_excluded,
        )
    }
}

/// Everything the rendering layer needs; handed out by shared reference only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prepared {
    pub dataset: Dataset,
    pub latest: LatestByCountry,
    pub series: TimeSeries,
    pub report: PrepareReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_get_set_cover_every_field() {
        let mut m = Measures::default();
        for (i, field) in NumericField::ALL.iter().enumerate() {
            m.set(*field, Some(i as f64));
        }
        for (i, field) in NumericField::ALL.iter().enumerate() {
            assert_eq!(m.get(*field), Some(i as f64), "{field}");
        }
    }

    #[test]
    fn missing_or_blank_continent_is_aggregate() {
        let mut rec = Record {
            location: "World".into(),
            date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            iso_code: Some("OWID_WRL".into()),
            continent: None,
            measures: Measures::default(),
            death_rate: f64::NAN,
            extra: BTreeMap::new(),
        };
        assert!(rec.is_aggregate());
        rec.continent = Some("  ".into());
        assert!(rec.is_aggregate());
        rec.continent = Some("Africa".into());
        assert!(!rec.is_aggregate());
    }
}
