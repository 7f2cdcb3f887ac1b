//! Writes `sample_covid.csv`: a small OWID-shaped table with the quirks the
//! tracker has to cope with (gaps, a zero-case start, a bad date, legacy
//! columns, a `World` aggregate row and an unselected country).

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

struct Country {
    iso_code: &'static str,
    continent: &'static str,
    location: &'static str,
    population: f64,
    /// Daily growth of new cases.
    growth: f64,
    fatality: f64,
    /// Fully vaccinated share reached by the last day, in percent.
    vaccinated_by_end: f64,
}

const COUNTRIES: [Country; 5] = [
    Country {
        iso_code: "KEN",
        continent: "Africa",
        location: "Kenya",
        population: 54e6,
        growth: 0.030,
        fatality: 0.017,
        vaccinated_by_end: 18.0,
    },
    Country {
        iso_code: "IND",
        continent: "Asia",
        location: "India",
        population: 1.4e9,
        growth: 0.045,
        fatality: 0.012,
        vaccinated_by_end: 65.0,
    },
    Country {
        iso_code: "USA",
        continent: "North America",
        location: "United States",
        population: 331e6,
        growth: 0.040,
        fatality: 0.011,
        vaccinated_by_end: 68.0,
    },
    Country {
        iso_code: "BRA",
        continent: "South America",
        location: "Brazil",
        population: 214e6,
        growth: 0.042,
        fatality: 0.020,
        vaccinated_by_end: 80.0,
    },
    // Aggregate rows carry no continent.
    Country {
        iso_code: "OWID_WRL",
        continent: "",
        location: "World",
        population: 7.9e9,
        growth: 0.050,
        fatality: 0.010,
        vaccinated_by_end: 60.0,
    },
];

const HEADER: [&str; 13] = [
    "SNo",
    "iso_code",
    "continent",
    "location",
    "date",
    "total_cases",
    "new_cases",
    "total_deaths",
    "new_deaths",
    "total_cases_per_million",
    "total_vaccinations",
    "people_fully_vaccinated_per_hundred",
    "Last_Updated_Time",
];

fn cell(value: f64, rng: &mut SimpleRng, gap_chance: f64) -> String {
    if rng.chance(gap_chance) {
        String::new()
    } else {
        format!("{value:.0}")
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).context("invalid start date")?;
    let days = 180;

    let output_path = "sample_covid.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(HEADER)?;

    let mut serial = 0u64;
    for country in &COUNTRIES {
        let mut total_cases = 0.0;
        let mut total_deaths = 0.0;

        for day in 0..days {
            let date = start + Duration::days(day);
            // Day 0 reports zero cases so the death rate is undefined there.
            let new_cases = if day == 0 {
                0.0
            } else {
                (50.0 * (country.growth * day as f64).exp() * (0.8 + 0.4 * rng.next_f64())).round()
            };
            let new_deaths = (new_cases * country.fatality).round();
            total_cases += new_cases;
            total_deaths += new_deaths;

            let vaccinated_pct = country.vaccinated_by_end * (day as f64 / (days - 1) as f64);
            let total_vaccinations = vaccinated_pct / 100.0 * country.population * 2.1;

            let mut date_text = date.format("%Y-%m-%d").to_string();
            if day == 17 && country.location == "Kenya" {
                date_text = "2021-13-45".to_string();
            }
            // Critical columns go missing now and then.
            let total_cases_text = if rng.chance(0.02) {
                String::new()
            } else {
                format!("{total_cases:.0}")
            };

            serial += 1;
            writer.write_record([
                serial.to_string(),
                country.iso_code.to_string(),
                country.continent.to_string(),
                country.location.to_string(),
                date_text,
                total_cases_text,
                cell(new_cases, &mut rng, 0.05),
                format!("{total_deaths:.0}"),
                cell(new_deaths, &mut rng, 0.05),
                cell(total_cases / country.population * 1e6, &mut rng, 0.10),
                // Vaccinations are reported weekly at best.
                if day % 7 == 0 { format!("{total_vaccinations:.0}") } else { String::new() },
                if day % 7 == 3 { format!("{vaccinated_pct:.2}") } else { String::new() },
                "2023-01-01 00:00:00".to_string(),
            ])?;
        }
    }
    writer.flush()?;

    println!(
        "Wrote {serial} rows for {} locations over {days} days to {output_path}",
        COUNTRIES.len()
    );
    Ok(())
}
