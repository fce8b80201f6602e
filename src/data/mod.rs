/// Data layer: core types, loading, caching, preparation and filtering.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (cells typed by inspection)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  Source → Arc<Dataset>, reloaded after the TTL
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  prepare  │  coerce numerics, fill "unknown", drop rows without price
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  rare-group cut-off, per-value selection → derived view
///   └──────────┘
/// ```
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod prepare;
pub mod schema;

pub use cache::{DatasetCache, Source};
pub use model::{Dataset, Record, Value};
pub use prepare::{load_prepared, prepare, PipelineConfig};
