use super::model::{LatestByCountry, Record, TimeSeries};

/// Drop region / world rollups (no continent) from `records`.
/// Returns the kept rows and the number dropped.
pub fn without_aggregates(records: &[Record]) -> (Vec<&Record>, usize) {
    let kept: Vec<&Record> = records.iter().filter(|r| !r.is_aggregate()).collect();
    let dropped = records.len() - kept.len();
    (kept, dropped)
}

/// Group by location; each group is stably sorted by date ascending.
pub fn time_series<'a>(records: impl IntoIterator<Item = &'a Record>) -> TimeSeries {
    let mut series = TimeSeries::new();
    for r in records {
        series.entry(r.location.clone()).or_default().push(r.clone());
    }
    for rows in series.values_mut() {
        rows.sort_by_key(|r| r.date);
    }
    series
}

/// One record per location: the last one once the group is date-sorted.
pub fn latest_by_country<'a>(records: impl IntoIterator<Item = &'a Record>) -> LatestByCountry {
    time_series(records)
        .into_iter()
        .filter_map(|(location, mut rows)| rows.pop().map(|last| (location, last)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::Measures;

    fn rec(location: &str, continent: Option<&str>, day: u32, cases: f64) -> Record {
        Record {
            location: location.to_string(),
            date: NaiveDate::from_ymd_opt(2022, 5, day).unwrap(),
            iso_code: None,
            continent: continent.map(str::to_string),
            measures: Measures {
                total_cases: Some(cases),
                total_deaths: Some(0.0),
                ..Measures::default()
            },
            death_rate: 0.0,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn aggregates_are_excluded() {
        let records = vec![
            rec("Kenya", Some("Africa"), 1, 1.0),
            rec("World", None, 1, 100.0),
        ];
        let (kept, dropped) = without_aggregates(&records);
        assert_eq!(dropped, 1);
        let series = time_series(kept.iter().copied());
        let latest = latest_by_country(kept);
        assert!(!series.contains_key("World"));
        assert!(!latest.contains_key("World"));
        assert!(latest.contains_key("Kenya"));
    }

    #[test]
    fn series_are_date_sorted_and_latest_is_max_date() {
        let records = vec![
            rec("India", Some("Asia"), 3, 30.0),
            rec("Kenya", Some("Africa"), 2, 2.0),
            rec("India", Some("Asia"), 1, 10.0),
            rec("India", Some("Asia"), 2, 20.0),
        ];
        let series = time_series(&records);
        let latest = latest_by_country(&records);

        let india: Vec<u32> = series["India"]
            .iter()
            .map(|r| r.measures.total_cases.unwrap() as u32)
            .collect();
        assert_eq!(india, [10, 20, 30]);
        assert_eq!(latest.len(), 2);
        for (location, last) in &latest {
            let max_date = series[location].iter().map(|r| r.date).max().unwrap();
            assert_eq!(last.date, max_date);
        }
        assert_eq!(latest["India"].measures.total_cases, Some(30.0));
    }

    #[test]
    fn ties_on_date_keep_the_later_row() {
        let records = vec![
            rec("Kenya", Some("Africa"), 4, 1.0),
            rec("Kenya", Some("Africa"), 4, 2.0),
        ];
        let latest = latest_by_country(&records);
        assert_eq!(latest["Kenya"].measures.total_cases, Some(2.0));
    }
}
