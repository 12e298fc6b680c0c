use crate::error::{ReportError, Result};
use crate::history::{build_price_history, community_series};
use crate::stats::{compute_basic_stats, compute_locations};
use crate::trend::{apply_trend_values, fit_trend_line};
use crate::types::{
    AnalysisSettings, CommunityLocation, CommunityStat, PeriodType, PriceHistoryRow, SortCriteria,
    TransactionRecord, TrendLine,
};
use crate::util::{format_period, period_to_months};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Upper bound on the top-N community selection.
pub const TOP_N_MAX: usize = 80;
/// Recent-activity threshold: a candidate community needs at least this many
/// transactions inside the trailing window to survive the optional filter.
pub const MIN_RECENT_TRANSACTIONS: usize = 5;
/// Trailing window, in months, anchored at the newest month present in the
/// filtered set.
pub const RECENT_WINDOW_MONTHS: i64 = 24;

/// Everything one recomputation produces. Rebuilt wholesale on every call;
/// the host swaps the previous value out in one move.
#[derive(Debug, Clone)]
pub struct DerivedResults {
    pub community_stats: Vec<CommunityStat>,
    pub price_history: Vec<PriceHistoryRow>,
    pub trend_lines: BTreeMap<String, TrendLine>,
    pub locations: Vec<CommunityLocation>,
    /// The auto-selected top-N list, in rank order.
    pub available_communities: Vec<String>,
    /// The communities the history and trend stages actually ran on.
    pub selected_communities: Vec<String>,
}

/// Apply the district and date-range filters to the working set.
///
/// An empty district selection means "all districts". Date bounds are
/// inclusive `YYYY-MM` strings compared against each record's
/// month-granularity label regardless of the configured period type;
/// lexicographic order is chronological for this zero-padded format.
pub fn filter_records(
    records: &[TransactionRecord],
    settings: &AnalysisSettings,
) -> Vec<TransactionRecord> {
    records
        .iter()
        .filter(|r| {
            if !settings.selected_districts.is_empty()
                && !settings.selected_districts.iter().any(|d| d == &r.district)
            {
                return false;
            }
            if settings.start_date.is_some() || settings.end_date.is_some() {
                let Some(month) = format_period(&r.date, PeriodType::Month) else {
                    return false;
                };
                if let Some(start) = &settings.start_date {
                    if month < *start {
                        return false;
                    }
                }
                if let Some(end) = &settings.end_date {
                    if month > *end {
                        return false;
                    }
                }
            }
            true
        })
        .cloned()
        .collect()
}

fn sort_key_cmp(a: &CommunityStat, b: &CommunityStat, criteria: SortCriteria) -> Ordering {
    let ord = match criteria {
        SortCriteria::CountDesc => b.count.cmp(&a.count),
        SortCriteria::MapeDesc => b.mape.partial_cmp(&a.mape).unwrap_or(Ordering::Equal),
        SortCriteria::MpeDesc => b.mpe.partial_cmp(&a.mpe).unwrap_or(Ordering::Equal),
        SortCriteria::MpeAsc => a.mpe.partial_cmp(&b.mpe).unwrap_or(Ordering::Equal),
    };
    // Name tie-break keeps the ranking stable across runs.
    ord.then_with(|| a.name.cmp(&b.name))
}

/// Count each community's transactions inside the trailing activity window.
/// The window is anchored at the newest month in the filtered set, so the
/// threshold stays meaningful for historical data sets too.
fn recent_counts(records: &[TransactionRecord]) -> HashMap<&str, usize> {
    let newest = records
        .iter()
        .filter_map(|r| format_period(&r.date, PeriodType::Month))
        .filter_map(|label| period_to_months(&label, PeriodType::Month))
        .max();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let Some(newest) = newest else {
        return counts;
    };
    let cutoff = newest - (RECENT_WINDOW_MONTHS - 1);
    for r in records {
        let in_window = format_period(&r.date, PeriodType::Month)
            .and_then(|label| period_to_months(&label, PeriodType::Month))
            .map(|ord| ord >= cutoff)
            .unwrap_or(false);
        if in_window {
            *counts.entry(r.community.as_str()).or_insert(0) += 1;
        }
    }
    counts
}

/// Rank the filtered set's communities by the configured criteria and keep
/// the first `top_n` (clamped to 1..=80) names.
pub fn select_top_communities(
    records: &[TransactionRecord],
    stats: &[CommunityStat],
    settings: &AnalysisSettings,
) -> Vec<String> {
    let mut candidates: Vec<&CommunityStat> = if settings.require_recent_activity {
        let recent = recent_counts(records);
        stats
            .iter()
            .filter(|s| {
                recent
                    .get(s.name.as_str())
                    .map(|c| *c >= MIN_RECENT_TRANSACTIONS)
                    .unwrap_or(false)
            })
            .collect()
    } else {
        stats.iter().collect()
    };
    candidates.sort_by(|a, b| sort_key_cmp(a, b, settings.sort_criteria));

    let top_n = settings.top_n.clamp(1, TOP_N_MAX);
    candidates
        .into_iter()
        .take(top_n)
        .map(|s| s.name.clone())
        .collect()
}

/// One full, synchronous recomputation: raw records plus a settings snapshot
/// in, every derived entity out. Pure — no I/O, no retained state — so the
/// host can call it on every settings change and atomically replace its view
/// of the results.
pub fn recompute(
    records: &[TransactionRecord],
    settings: &AnalysisSettings,
) -> Result<DerivedResults> {
    if records.is_empty() {
        return Err(ReportError::NoValidRecords);
    }
    let filtered = filter_records(records, settings);
    if filtered.is_empty() {
        return Err(ReportError::EmptyFilteredSet);
    }

    let community_stats = compute_basic_stats(&filtered);
    let locations = compute_locations(&filtered);
    let available_communities = select_top_communities(&filtered, &community_stats, settings);
    let selected_communities = if settings.selected_communities.is_empty() {
        available_communities.clone()
    } else {
        settings.selected_communities.clone()
    };

    let mut price_history = build_price_history(
        &filtered,
        &selected_communities,
        settings.period_type,
        settings.aggregation_type,
    );

    let mut trend_lines: BTreeMap<String, TrendLine> = BTreeMap::new();
    for community in &selected_communities {
        let (prices, periods) = community_series(&price_history, community);
        if prices.len() < 2 {
            continue;
        }
        let line = fit_trend_line(
            &prices,
            &periods,
            settings.period_type,
            settings.use_log_transform,
        );
        apply_trend_values(&mut price_history, community, &line, settings.period_type);
        trend_lines.insert(community.clone(), line);
    }

    Ok(DerivedResults {
        community_stats,
        price_history,
        trend_lines,
        locations,
        available_communities,
        selected_communities,
    })
}
