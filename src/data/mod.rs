/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv (; latin-1) / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset, trim column names
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, column kinds, job / month domains
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  age range ∧ job set ∧ month set → visible indices
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
