use crate::error::Result;
use crate::types::{
    CommunityLocation, CommunityStat, CommunityStatRow, LocationRow, PriceHistoryRow,
};
use crate::util::format_number;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Export the sparse price history with one column per selected community
/// plus its `<name>_trend` companion. The column set depends on the current
/// selection, so the header and each record are assembled by hand instead of
/// going through serde. Sparse cells become empty strings.
pub fn write_history_csv(
    path: &str,
    history: &[PriceHistoryRow],
    communities: &[String],
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["Period".to_string()];
    for c in communities {
        header.push(c.clone());
        header.push(format!("{}_trend", c));
    }
    wtr.write_record(&header)?;

    for row in history {
        let mut record = vec![row.period.clone()];
        for c in communities {
            record.push(
                row.prices
                    .get(c)
                    .map(|v| format!("{:.2}", v))
                    .unwrap_or_default(),
            );
            record.push(
                row.trend
                    .get(c)
                    .map(|v| format!("{:.2}", v))
                    .unwrap_or_default(),
            );
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render community statistics into display rows with locale-formatted
/// prices and percentage error metrics.
pub fn stat_rows(stats: &[CommunityStat]) -> Vec<CommunityStatRow> {
    stats
        .iter()
        .map(|s| CommunityStatRow {
            community: s.name.clone(),
            count: s.count,
            avg_price: format_number(s.avg_price, 2),
            min_price: format_number(s.min_price, 2),
            max_price: format_number(s.max_price, 2),
            mape: format!("{:.2}%", s.mape * 100.0),
            mpe: format!("{:.2}%", s.mpe * 100.0),
        })
        .collect()
}

pub fn location_rows(locations: &[CommunityLocation]) -> Vec<LocationRow> {
    locations
        .iter()
        .map(|l| LocationRow {
            community: l.name.clone(),
            lat: format!("{:.5}", l.lat),
            lng: format!("{:.5}", l.lng),
            count: l.count,
            avg_price: format_number(l.avg_price, 2),
        })
        .collect()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn history_csv_leaves_sparse_cells_empty() {
        let mut row = PriceHistoryRow {
            period: "2023-01".to_string(),
            prices: BTreeMap::new(),
            trend: BTreeMap::new(),
        };
        row.prices.insert("A".to_string(), 100.0);
        row.trend.insert("A".to_string(), 105.0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let communities = vec!["A".to_string(), "B".to_string()];
        write_history_csv(path.to_str().unwrap(), &[row], &communities).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("Period,A,A_trend,B,B_trend"));
        assert_eq!(lines.next(), Some("2023-01,100.00,105.00,,"));
    }

    #[test]
    fn stat_rows_format_percentages() {
        let rows = stat_rows(&[CommunityStat {
            name: "A".to_string(),
            count: 2,
            avg_price: 1_234_567.5,
            min_price: 1_000_000.0,
            max_price: 1_469_135.0,
            mape: 0.0365,
            mpe: 0.0048,
        }]);
        assert_eq!(rows[0].avg_price, "1,234,567.50");
        assert_eq!(rows[0].mape, "3.65%");
        assert_eq!(rows[0].mpe, "0.48%");
    }
}
