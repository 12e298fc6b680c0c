use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabled::Tabled;

#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "TransactionDate")]
    pub transaction_date: Option<String>,
    #[serde(rename = "Community")]
    pub community: Option<String>,
    #[serde(rename = "Price")]
    pub price: Option<String>,
    #[serde(rename = "Valuation")]
    pub valuation: Option<String>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "District")]
    pub district: Option<String>,
    #[serde(rename = "Latitude")]
    pub latitude: Option<String>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<String>,
    #[serde(rename = "Address")]
    pub address: Option<String>,
}

/// One validated transaction. `date` keeps the raw `YYYYMMDD` string; period
/// bucketing slices it rather than round-tripping through a date type.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub date: String,
    pub community: String,
    pub price: f64,
    pub valuation: f64,
    pub city: String,
    pub district: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodType {
    Month,
    Quarter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationType {
    Mean,
    Median,
}

/// Ordering applied when auto-selecting the top-N communities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriteria {
    /// Transaction count, descending.
    CountDesc,
    /// Mean absolute percentage error, descending.
    MapeDesc,
    /// Mean percentage error, descending.
    MpeDesc,
    /// Mean percentage error, ascending.
    MpeAsc,
}

/// Settings bag driving one full recomputation of the pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub period_type: PeriodType,
    pub aggregation_type: AggregationType,
    /// Clamped to 1..=80 before use.
    pub top_n: usize,
    pub sort_criteria: SortCriteria,
    /// Empty means "all districts".
    pub selected_districts: Vec<String>,
    /// Empty means "use the auto-selected top-N list".
    pub selected_communities: Vec<String>,
    /// Inclusive `YYYY-MM` bounds; `None` is unbounded on that side.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub use_log_transform: bool,
    /// Restrict top-N candidates to communities with enough recent activity.
    pub require_recent_activity: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            period_type: PeriodType::Month,
            aggregation_type: AggregationType::Mean,
            top_n: 5,
            sort_criteria: SortCriteria::CountDesc,
            selected_districts: Vec::new(),
            selected_communities: Vec::new(),
            start_date: None,
            end_date: None,
            use_log_transform: false,
            require_recent_activity: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityStat {
    pub name: String,
    pub count: usize,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub mape: f64,
    pub mpe: f64,
}

/// One period bucket of the price history. Both maps are sparse: a community
/// appears in `prices` only if it had at least one transaction in the period,
/// and in `trend` only inside its fitted ordinal span. Absence means "no
/// transaction", which is distinct from "transacted at 0".
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistoryRow {
    pub period: String,
    pub prices: BTreeMap<String, f64>,
    pub trend: BTreeMap<String, f64>,
}

impl PriceHistoryRow {
    pub fn new(period: String) -> Self {
        PriceHistoryRow {
            period,
            prices: BTreeMap::new(),
            trend: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    pub r2: f64,
    pub is_log_transformed: bool,
}

impl TrendLine {
    /// Degenerate result for fewer than two usable observations. Callers
    /// treat it as "insufficient data", not as a flat trend.
    pub fn degenerate(is_log_transformed: bool) -> Self {
        TrendLine {
            slope: 0.0,
            intercept: 0.0,
            r2: 0.0,
            is_log_transformed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityLocation {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub count: usize,
    pub avg_price: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CommunityStatRow {
    #[serde(rename = "Community")]
    #[tabled(rename = "Community")]
    pub community: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "AvgPrice")]
    #[tabled(rename = "AvgPrice")]
    pub avg_price: String,
    #[serde(rename = "MinPrice")]
    #[tabled(rename = "MinPrice")]
    pub min_price: String,
    #[serde(rename = "MaxPrice")]
    #[tabled(rename = "MaxPrice")]
    pub max_price: String,
    #[serde(rename = "MAPE")]
    #[tabled(rename = "MAPE")]
    pub mape: String,
    #[serde(rename = "MPE")]
    #[tabled(rename = "MPE")]
    pub mpe: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct LocationRow {
    #[serde(rename = "Community")]
    #[tabled(rename = "Community")]
    pub community: String,
    #[serde(rename = "Latitude")]
    #[tabled(rename = "Latitude")]
    pub lat: String,
    #[serde(rename = "Longitude")]
    #[tabled(rename = "Longitude")]
    pub lng: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "AvgPrice")]
    #[tabled(rename = "AvgPrice")]
    pub avg_price: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub total_communities: usize,
    pub total_districts: usize,
    pub overall_avg_price: f64,
    pub overall_mape: f64,
    pub generated_at: String,
}
