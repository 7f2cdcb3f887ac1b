//! Cleaning stages: each takes the rows produced by the previous one.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{NumericField, RawRecord, RawTable, Record};

/// Formats accepted for the `date` column, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

// ---------------------------------------------------------------------------
// Row / column selection
// ---------------------------------------------------------------------------

/// Keep rows whose location is in `countries`, preserving row order.
pub fn filter_countries(records: Vec<RawRecord>, countries: &BTreeSet<String>) -> Vec<RawRecord> {
    records
        .into_iter()
        .filter(|r| r.location.as_ref().is_some_and(|l| countries.contains(l)))
        .collect()
}

/// Drop `legacy` columns from the header and every row. Absent columns are
/// ignored. Returns the names actually removed.
pub fn prune_columns(table: &mut RawTable, legacy: &[String]) -> Vec<String> {
    let removed: Vec<String> = table
        .columns
        .iter()
        .filter(|c| legacy.contains(c))
        .cloned()
        .collect();
    if removed.is_empty() {
        return removed;
    }

    table.columns.retain(|c| !removed.contains(c));
    for record in &mut table.records {
        for column in &removed {
            record.extra.remove(column);
        }
    }
    removed
}

/// Remove rows missing `date`, `total_cases` or `total_deaths`.
/// Returns the kept rows and the number dropped.
pub fn prune_rows(records: Vec<RawRecord>) -> (Vec<RawRecord>, usize) {
    let before = records.len();
    let kept: Vec<RawRecord> = records
        .into_iter()
        .filter(|r| {
            r.date.is_some()
                && r.measures.total_cases.is_some()
                && r.measures.total_deaths.is_some()
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse a date cell. A trailing time component (`2021-03-01 00:00:00`) is
/// accepted and discarded.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let day = text.trim().split(['T', ' ']).next().unwrap_or("");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

/// Convert rows to [`Record`]s, excluding rows whose date does not parse.
/// Returns the records and the number excluded.
pub fn normalize_dates(records: Vec<RawRecord>) -> (Vec<Record>, usize) {
    let mut out = Vec::with_capacity(records.len());
    let mut bad = 0;

    for raw in records {
        let (Some(location), Some(date_text)) = (raw.location, raw.date) else {
            bad += 1;
            continue;
        };
        let Some(date) = parse_date(&date_text) else {
            log::warn!("Excluding {location} row with unparseable date '{date_text}'");
            bad += 1;
            continue;
        };

        out.push(Record {
            location,
            date,
            iso_code: raw.iso_code,
            continent: raw.continent,
            measures: raw.measures,
            death_rate: f64::NAN,
            extra: raw.extra,
        });
    }
    (out, bad)
}

// ---------------------------------------------------------------------------
// Gap filling – three independent passes
// ---------------------------------------------------------------------------

/// Fill interior nulls linearly between the nearest observed neighbours, by
/// position. Leading and trailing nulls are left alone.
pub fn interpolate_linear(values: &mut [Option<f64>]) {
    let mut prev: Option<(usize, f64)> = None;
    for i in 0..values.len() {
        let Some(v) = values[i] else {
            continue;
        };
        if let Some((p, pv)) = prev {
            let span = (i - p) as f64;
            for (k, slot) in values.iter_mut().enumerate().take(i).skip(p + 1) {
                let t = (k - p) as f64 / span;
                *slot = Some(pv + (v - pv) * t);
            }
        }
        prev = Some((i, v));
    }
}

/// Replace each null with the next observed value after it.
pub fn backfill(values: &mut [Option<f64>]) {
    let mut next: Option<f64> = None;
    for slot in values.iter_mut().rev() {
        match slot {
            Some(v) => next = Some(*v),
            None => *slot = next,
        }
    }
}

/// Replace each null with the previous observed value before it.
pub fn forward_fill(values: &mut [Option<f64>]) {
    let mut prev: Option<f64> = None;
    for slot in values.iter_mut() {
        match slot {
            Some(v) => prev = Some(*v),
            None => *slot = prev,
        }
    }
}

/// Row indices per location, each group ordered by date (stable on ties).
pub fn date_sorted_groups(records: &[Record]) -> BTreeMap<&str, Vec<usize>> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, r) in records.iter().enumerate() {
        groups.entry(r.location.as_str()).or_default().push(i);
    }
    for indices in groups.values_mut() {
        indices.sort_by_key(|&i| records[i].date);
    }
    groups
}

/// Gap-fill every declared numeric field per location over the date-sorted
/// rows: interpolate, then backfill, then forward-fill. Row order of
/// `records` is unchanged. A group with no observed value stays null.
pub fn fill_gaps(records: &mut [Record]) {
    let groups: Vec<Vec<usize>> = date_sorted_groups(records).into_values().collect();

    for indices in &groups {
        for field in NumericField::ALL {
            let mut column: Vec<Option<f64>> =
                indices.iter().map(|&i| records[i].value(field)).collect();
            if column.iter().all(Option::is_some) {
                continue;
            }
            interpolate_linear(&mut column);
            backfill(&mut column);
            forward_fill(&mut column);
            for (&i, value) in indices.iter().zip(column) {
                records[i].measures.set(field, value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Derived metric
// ---------------------------------------------------------------------------

/// `deaths / cases`, or NaN when the ratio is undefined.
pub fn death_rate(total_deaths: f64, total_cases: f64) -> f64 {
    if total_cases == 0.0 {
        return f64::NAN;
    }
    let rate = total_deaths / total_cases;
    if rate.is_finite() {
        rate
    } else {
        f64::NAN
    }
}

pub fn derive_death_rate(records: &mut [Record]) {
    for r in records {
        r.death_rate = match (r.measures.total_deaths, r.measures.total_cases) {
            (Some(deaths), Some(cases)) => death_rate(deaths, cases),
            _ => f64::NAN,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Measures;

    fn raw(
        location: &str,
        date: Option<&str>,
        cases: Option<f64>,
        deaths: Option<f64>,
    ) -> RawRecord {
        RawRecord {
            location: Some(location.to_string()),
            date: date.map(str::to_string),
            continent: Some("Africa".into()),
            measures: Measures {
                total_cases: cases,
                total_deaths: deaths,
                ..Measures::default()
            },
            ..RawRecord::default()
        }
    }

    fn record(location: &str, day: u32, cases: Option<f64>) -> Record {
        Record {
            location: location.to_string(),
            date: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
            iso_code: None,
            continent: Some("Asia".into()),
            measures: Measures {
                total_cases: cases,
                total_deaths: Some(0.0),
                ..Measures::default()
            },
            death_rate: f64::NAN,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn country_filter_keeps_row_order() {
        let rows = vec![
            raw("India", Some("2021-01-02"), Some(1.0), Some(0.0)),
            raw("Brazil", Some("2021-01-01"), Some(1.0), Some(0.0)),
            raw("Kenya", Some("2021-01-01"), Some(1.0), Some(0.0)),
            RawRecord::default(),
        ];
        let countries: BTreeSet<String> =
            ["Kenya", "India"].iter().map(|s| s.to_string()).collect();
        let kept = filter_countries(rows, &countries);
        let names: Vec<_> = kept.iter().map(|r| r.location.as_deref().unwrap()).collect();
        assert_eq!(names, ["India", "Kenya"]);
    }

    #[test]
    fn pruning_absent_columns_is_a_no_op() {
        let mut table = RawTable {
            columns: vec!["location".into(), "date".into()],
            records: vec![raw("Kenya", Some("2021-01-01"), Some(1.0), Some(0.0))],
        };
        let before = table.clone();
        let removed = prune_columns(&mut table, &["SNo".to_string()]);
        assert!(removed.is_empty());
        assert_eq!(table, before);
    }

    #[test]
    fn pruning_removes_header_and_cells() {
        let mut rec = raw("Kenya", Some("2021-01-01"), Some(1.0), Some(0.0));
        rec.extra.insert("SNo".into(), "1".into());
        rec.extra.insert("tests".into(), "9".into());
        let mut table = RawTable {
            columns: vec!["SNo".into(), "location".into(), "tests".into()],
            records: vec![rec],
        };
        let removed = prune_columns(
            &mut table,
            &["SNo".to_string(), "Last_Updated_Time".to_string()],
        );
        assert_eq!(removed, ["SNo"]);
        assert_eq!(table.columns, ["location", "tests"]);
        assert!(!table.records[0].extra.contains_key("SNo"));
        assert!(table.records[0].extra.contains_key("tests"));
    }

    #[test]
    fn rows_missing_critical_values_are_dropped() {
        let rows = vec![
            raw("Kenya", Some("2021-01-01"), Some(1.0), Some(0.0)),
            raw("Kenya", None, Some(1.0), Some(0.0)),
            raw("Kenya", Some("2021-01-03"), None, Some(0.0)),
            raw("Kenya", Some("2021-01-04"), Some(1.0), None),
        ];
        let (kept, dropped) = prune_rows(rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(dropped, 3);
    }

    #[test]
    fn parse_date_accepts_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 14);
        assert_eq!(parse_date("2021-03-14"), expected);
        assert_eq!(parse_date("2021/03/14"), expected);
        assert_eq!(parse_date("14/03/2021"), expected);
        assert_eq!(parse_date("2021-03-14 00:00:00"), expected);
        assert_eq!(parse_date("2021-03-14T12:00:00"), expected);
        assert_eq!(parse_date("2021-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn malformed_date_excludes_only_that_row() {
        let rows = vec![
            raw("Kenya", Some("2021-01-01"), Some(1.0), Some(0.0)),
            raw("Kenya", Some("not a date"), Some(2.0), Some(0.0)),
        ];
        let (records, bad) = normalize_dates(rows);
        assert_eq!(records.len(), 1);
        assert_eq!(bad, 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
    }

    #[test]
    fn interpolation_fills_interior_gap() {
        let mut v = vec![Some(10.0), None, Some(30.0)];
        interpolate_linear(&mut v);
        assert_eq!(v, [Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn interpolation_is_positional_across_wide_gaps() {
        let mut v = vec![None, Some(0.0), None, None, Some(3.0), None];
        interpolate_linear(&mut v);
        assert_eq!(v, [None, Some(0.0), Some(1.0), Some(2.0), Some(3.0), None]);
    }

    #[test]
    fn backfill_then_forward_fill_cover_the_edges() {
        let mut v = vec![None, None, Some(5.0), Some(10.0), None];
        interpolate_linear(&mut v);
        backfill(&mut v);
        assert_eq!(v, [Some(5.0), Some(5.0), Some(5.0), Some(10.0), None]);
        forward_fill(&mut v);
        assert_eq!(v, [Some(5.0), Some(5.0), Some(5.0), Some(10.0), Some(10.0)]);
    }

    #[test]
    fn fill_passes_handle_empty_and_single_value_groups() {
        let mut empty: Vec<Option<f64>> = vec![None, None];
        interpolate_linear(&mut empty);
        backfill(&mut empty);
        forward_fill(&mut empty);
        assert_eq!(empty, [None, None]);

        let mut single = vec![None, Some(4.0), None];
        interpolate_linear(&mut single);
        assert_eq!(single, [None, Some(4.0), None]);
        backfill(&mut single);
        forward_fill(&mut single);
        assert_eq!(single, [Some(4.0), Some(4.0), Some(4.0)]);
    }

    #[test]
    fn fill_gaps_works_on_date_order_not_row_order() {
        // Rows arrive as day 3, day 1, day 2 (gap).
        let mut records = vec![
            record("X", 3, Some(30.0)),
            record("X", 1, Some(10.0)),
            record("X", 2, None),
            record("Y", 1, Some(7.0)),
        ];
        fill_gaps(&mut records);
        assert_eq!(records[2].measures.total_cases, Some(20.0));
        assert_eq!(records[0].measures.total_cases, Some(30.0));
        // Groups never leak into each other.
        assert_eq!(records[3].measures.total_cases, Some(7.0));
        // A field never observed in a group stays null.
        assert_eq!(records[3].measures.new_cases, None);
    }

    #[test]
    fn death_rate_is_nan_for_zero_cases() {
        assert!(death_rate(0.0, 0.0).is_nan());
        assert!(death_rate(3.0, 0.0).is_nan());
        assert_eq!(death_rate(1.0, 4.0), 0.25);

        let mut records = vec![record("X", 1, Some(0.0)), record("X", 2, Some(10.0))];
        records[1].measures.total_deaths = Some(1.0);
        derive_death_rate(&mut records);
        assert!(records[0].death_rate.is_nan());
        assert_eq!(records[1].death_rate, 0.1);
    }
}
