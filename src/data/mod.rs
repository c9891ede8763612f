/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  remote / local prematch_export.csv
///        │
///        ▼
///   ┌──────────────────┐
///   │ source + loader  │  fetch, clean rows → Snapshot (memoized)
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Snapshot │  Vec<OddsRow>, LoadStats
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  league + date floor + label length → Table
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod source;
