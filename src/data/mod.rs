/// Data layer: core types, loading, cleaning and per-country views.
///
/// Architecture:
/// ```text
///   .csv / .tsv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (header checked)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  filter countries → prune columns/rows → dates
///   │           │  → interpolate / backfill / forward-fill → death_rate
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  views    │  drop aggregates → TimeSeries, LatestByCountry
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  ranking, vaccination share, correlation
///   └──────────┘
/// ```
///
/// `pipeline` strings the first three together.

pub mod clean;
pub mod error;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod stats;
pub mod views;
