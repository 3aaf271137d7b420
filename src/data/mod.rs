/// Data layer: typed records, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .xls
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read cells → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  normalize headers, type rows, drop bad rows → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → FilteredView (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, group sums, monthly trend → DashboardSnapshot
///   └───────────┘
/// ```
///
/// `prices` is a separate path for daily OHLC exports.

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod prices;
pub mod schema;
pub mod snapshot;
