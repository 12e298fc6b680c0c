use crate::types::{CommunityLocation, CommunityStat, SummaryStats, TransactionRecord};
use crate::util::average;
use std::collections::{BTreeMap, BTreeSet};

/// Per-community descriptive statistics over the filtered record set.
///
/// Grouping runs through a `BTreeMap`, so the output order is the
/// communities' name order; callers that want count- or error-ranked
/// output sort afterwards (see `pipeline::rank_communities`).
pub fn compute_basic_stats(records: &[TransactionRecord]) -> Vec<CommunityStat> {
    #[derive(Default)]
    struct Acc {
        prices: Vec<f64>,
        apes: Vec<f64>,
        pes: Vec<f64>,
    }

    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in records {
        let e = map.entry(r.community.as_str()).or_default();
        e.prices.push(r.price);
        // A valuation of 0 means "no estimate"; dividing by it would poison
        // the group means with infinities, so such records contribute 0 to
        // both error metrics.
        if r.valuation == 0.0 {
            e.apes.push(0.0);
            e.pes.push(0.0);
        } else {
            let pe = (r.price - r.valuation) / r.valuation;
            e.apes.push(pe.abs());
            e.pes.push(pe);
        }
    }

    map.into_iter()
        .map(|(name, acc)| {
            let min_price = acc.prices.iter().copied().fold(f64::INFINITY, f64::min);
            let max_price = acc.prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            CommunityStat {
                name: name.to_string(),
                count: acc.prices.len(),
                avg_price: average(&acc.prices),
                min_price: if min_price.is_finite() { min_price } else { 0.0 },
                max_price: if max_price.is_finite() { max_price } else { 0.0 },
                mape: average(&acc.apes),
                mpe: average(&acc.pes),
            }
        })
        .collect()
}

/// Map-view positions: one averaged coordinate per community, using only the
/// records that carry both a latitude and a longitude. Communities without a
/// single geocoded record are left out entirely rather than pinned at (0, 0).
pub fn compute_locations(records: &[TransactionRecord]) -> Vec<CommunityLocation> {
    #[derive(Default)]
    struct Acc {
        lat_sum: f64,
        lng_sum: f64,
        geocoded: usize,
        prices: Vec<f64>,
    }

    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in records {
        let e = map.entry(r.community.as_str()).or_default();
        e.prices.push(r.price);
        if let (Some(lat), Some(lng)) = (r.lat, r.lng) {
            e.lat_sum += lat;
            e.lng_sum += lng;
            e.geocoded += 1;
        }
    }

    map.into_iter()
        .filter(|(_, acc)| acc.geocoded > 0)
        .map(|(name, acc)| CommunityLocation {
            name: name.to_string(),
            lat: acc.lat_sum / acc.geocoded as f64,
            lng: acc.lng_sum / acc.geocoded as f64,
            count: acc.prices.len(),
            avg_price: average(&acc.prices),
        })
        .collect()
}

/// Headline totals over the working set, exported alongside the per-report
/// CSV files. Timestamped so exported summaries can be told apart.
pub fn compute_summary(records: &[TransactionRecord], stats: &[CommunityStat]) -> SummaryStats {
    let districts: BTreeSet<&str> = records.iter().map(|r| r.district.as_str()).collect();
    let prices: Vec<f64> = records.iter().map(|r| r.price).collect();
    let apes: Vec<f64> = records
        .iter()
        .map(|r| {
            if r.valuation == 0.0 {
                0.0
            } else {
                ((r.price - r.valuation) / r.valuation).abs()
            }
        })
        .collect();
    SummaryStats {
        total_records: records.len(),
        total_communities: stats.len(),
        total_districts: districts.len(),
        overall_avg_price: average(&prices),
        overall_mape: average(&apes),
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}
