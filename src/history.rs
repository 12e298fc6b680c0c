use crate::types::{AggregationType, PeriodType, PriceHistoryRow, TransactionRecord};
use crate::util::{average, format_period, median_upper};
use std::collections::BTreeMap;

/// Bucket the selected communities' transactions into one row per period.
///
/// A community gets a value in a row only when it had at least one
/// transaction in that period; the row stays sparse otherwise, which is how
/// downstream consumers tell "no trade" apart from "traded at 0". Rows come
/// back sorted ascending by period label — lexicographic order matches
/// chronological order for the zero-padded `YYYY-MM` / `YYYY-Qn` labels.
pub fn build_price_history(
    records: &[TransactionRecord],
    selected_communities: &[String],
    period_type: PeriodType,
    aggregation_type: AggregationType,
) -> Vec<PriceHistoryRow> {
    // period label -> community -> prices observed in that bucket
    let mut buckets: BTreeMap<String, BTreeMap<&str, Vec<f64>>> = BTreeMap::new();
    for r in records {
        if !selected_communities.iter().any(|c| c == &r.community) {
            continue;
        }
        let Some(period) = format_period(&r.date, period_type) else {
            continue;
        };
        buckets
            .entry(period)
            .or_default()
            .entry(r.community.as_str())
            .or_default()
            .push(r.price);
    }

    buckets
        .into_iter()
        .map(|(period, groups)| {
            let mut row = PriceHistoryRow::new(period);
            for (community, prices) in groups {
                let value = match aggregation_type {
                    AggregationType::Mean => average(&prices),
                    AggregationType::Median => median_upper(prices),
                };
                row.prices.insert(community.to_string(), value);
            }
            row
        })
        .collect()
}

/// Project one community's non-sparse observations out of the history:
/// `(aggregated price, period label)` pairs in row order. This is the input
/// shape the trend estimator works on.
pub fn community_series(history: &[PriceHistoryRow], community: &str) -> (Vec<f64>, Vec<String>) {
    let mut prices = Vec::new();
    let mut periods = Vec::new();
    for row in history {
        if let Some(p) = row.prices.get(community) {
            prices.push(*p);
            periods.push(row.period.clone());
        }
    }
    (prices, periods)
}
