use super::model::{LatestByCountry, Metric, NumericField, Record};

/// Metrics shown in the correlation heatmap.
pub const CORRELATION_METRICS: [Metric; 5] = [
    Metric::Measure(NumericField::TotalCases),
    Metric::Measure(NumericField::TotalDeaths),
    Metric::Measure(NumericField::NewCases),
    Metric::Measure(NumericField::NewDeaths),
    Metric::DeathRate,
];

// ---------------------------------------------------------------------------
// Summaries over finite values
// ---------------------------------------------------------------------------

/// Count / min / max / mean of the finite values seen. Non-finite values
/// (the undefined death rate) are skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

pub fn finite_summary(values: impl IntoIterator<Item = f64>) -> Option<Summary> {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        count += 1;
        sum += v;
        min = min.min(v);
        max = max.max(v);
    }
    (count > 0).then(|| Summary {
        count,
        min,
        max,
        mean: sum / count as f64,
    })
}

// ---------------------------------------------------------------------------
// Latest-snapshot helpers
// ---------------------------------------------------------------------------

/// Latest records ordered by `total_cases`, largest first.
pub fn rank_by_total_cases(latest: &LatestByCountry) -> Vec<&Record> {
    let mut ranked: Vec<&Record> = latest.values().collect();
    ranked.sort_by(|a, b| {
        let a = a.measures.total_cases.unwrap_or(f64::NEG_INFINITY);
        let b = b.measures.total_cases.unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
    ranked
}

/// `(vaccinated, unvaccinated)` percentages, clamped to 0..=100.
pub fn vaccination_share(record: &Record) -> Option<(f64, f64)> {
    let vaccinated = record
        .measures
        .people_fully_vaccinated_per_hundred
        .filter(|v| v.is_finite())?
        .clamp(0.0, 100.0);
    Some((vaccinated, 100.0 - vaccinated))
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub metrics: Vec<Metric>,
    /// Row-major, `metrics.len()` squared. NaN where undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }
}

/// Pearson correlation between every pair of `metrics`, using only rows
/// where both values are present and finite.
pub fn correlation_matrix<'a, I>(records: I, metrics: &[Metric]) -> CorrelationMatrix
where
    I: IntoIterator<Item = &'a Record>,
{
    let rows: Vec<Vec<Option<f64>>> = records
        .into_iter()
        .map(|r| {
            metrics
                .iter()
                .map(|&m| r.metric(m).filter(|v| v.is_finite()))
                .collect()
        })
        .collect();

    let n = metrics.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let pairs = rows.iter().filter_map(|row| Some((row[i]?, row[j]?)));
            let r = pearson(pairs);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        metrics: metrics.to_vec(),
        values,
    }
}

/// NaN with fewer than two pairs or zero variance on either side.
fn pearson(pairs: impl Iterator<Item = (f64, f64)>) -> f64 {
    let pairs: Vec<(f64, f64)> = pairs.collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::clean::death_rate;
    use crate::data::model::Measures;

    fn rec(location: &str, cases: f64, deaths: f64) -> Record {
        Record {
            location: location.to_string(),
            date: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
            iso_code: None,
            continent: Some("Asia".into()),
            measures: Measures {
                total_cases: Some(cases),
                total_deaths: Some(deaths),
                new_cases: Some(cases * 2.0),
                new_deaths: Some(-deaths),
                ..Measures::default()
            },
            death_rate: death_rate(deaths, cases),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn nan_death_rate_never_enters_a_summary() {
        let records = [rec("A", 0.0, 0.0), rec("A", 10.0, 1.0), rec("A", 10.0, 3.0)];
        let summary = finite_summary(records.iter().map(|r| r.death_rate)).unwrap();
        assert_eq!(summary.count, 2);
        assert!((summary.mean - 0.2).abs() < 1e-12);
        assert_eq!(summary.max, 0.3);
        assert!(finite_summary([f64::NAN, f64::INFINITY]).is_none());
    }

    #[test]
    fn correlation_skips_undefined_death_rate() {
        let records = [
            rec("A", 0.0, 0.0),
            rec("A", 10.0, 1.0),
            rec("A", 20.0, 4.0),
            rec("A", 40.0, 12.0),
        ];
        let m = correlation_matrix(&records, &CORRELATION_METRICS);
        assert_eq!(m.metrics.len(), 5);
        // cases vs new_cases are perfectly linear.
        assert!((m.get(0, 2) - 1.0).abs() < 1e-12);
        // deaths vs new_deaths are perfectly anti-linear.
        assert!((m.get(1, 3) + 1.0).abs() < 1e-12);
        // death_rate column is computed from the three defined rows only.
        let rate_vs_cases = m.get(4, 0);
        assert!(rate_vs_cases.is_finite());
        assert!(rate_vs_cases > 0.9);
        assert_eq!(m.get(4, 0), m.get(0, 4));
    }

    #[test]
    fn correlation_is_nan_without_variance() {
        let records = [rec("A", 5.0, 1.0), rec("A", 5.0, 2.0)];
        let m = correlation_matrix(&records, &CORRELATION_METRICS);
        assert!(m.get(0, 1).is_nan());
    }

    #[test]
    fn ranking_is_descending_by_total_cases() {
        let latest: LatestByCountry = [
            ("India".to_string(), rec("India", 300.0, 3.0)),
            ("Kenya".to_string(), rec("Kenya", 10.0, 1.0)),
            ("United States".to_string(), rec("United States", 900.0, 9.0)),
        ]
        .into_iter()
        .collect();
        let order: Vec<&str> = rank_by_total_cases(&latest)
            .iter()
            .map(|r| r.location.as_str())
            .collect();
        assert_eq!(order, ["United States", "India", "Kenya"]);
    }

    #[test]
    fn vaccination_share_splits_one_hundred() {
        let mut r = rec("Kenya", 1.0, 0.0);
        assert_eq!(vaccination_share(&r), None);
        r.measures.people_fully_vaccinated_per_hundred = Some(23.5);
        assert_eq!(vaccination_share(&r), Some((23.5, 76.5)));
        r.measures.people_fully_vaccinated_per_hundred = Some(130.0);
        assert_eq!(vaccination_share(&r), Some((100.0, 0.0)));
    }
}
