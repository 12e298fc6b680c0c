// Aggregation and trend-estimation pipeline for housing transaction CSVs.
//
// The library side is a pure, synchronous pipeline: validated records plus an
// `AnalysisSettings` snapshot go into `pipeline::recompute`, and every
// derived entity (community statistics, sparse price history, trend lines,
// map locations) comes back rebuilt from scratch. The binary in `main.rs`
// wraps it in a small menu-driven report generator.
pub mod error;
pub mod history;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod stats;
pub mod trend;
pub mod types;
pub mod util;

pub use error::{ReportError, Result};
pub use pipeline::{recompute, DerivedResults};
pub use types::{
    AggregationType, AnalysisSettings, CommunityLocation, CommunityStat, PeriodType,
    PriceHistoryRow, SortCriteria, TransactionRecord, TrendLine,
};
