use crate::error::Result;
use crate::types::{RawRow, TransactionRecord};
use crate::util::{parse_f64_safe, valid_transaction_date};
use csv::ReaderBuilder;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub skipped_rows: usize,
}

/// Validate one raw CSV row and turn it into a `TransactionRecord`.
///
/// Required fields are the transaction date (`YYYYMMDD` shape, month
/// 01..=12), the community name, and a finite positive price. Rows failing
/// any of these are dropped; everything downstream assumes they never
/// existed. Valuation is optional and defaults to 0, which the error
/// metrics treat as "no valuation available". Coordinates are optional.
pub fn clean_row(row: RawRow) -> Option<TransactionRecord> {
    let date = row.transaction_date?.trim().to_string();
    if !valid_transaction_date(&date) {
        return None;
    }
    let community = row.community?.trim().to_string();
    if community.is_empty() {
        return None;
    }
    let price = match parse_f64_safe(row.price.as_deref()) {
        Some(p) if p.is_finite() && p > 0.0 => p,
        _ => return None,
    };
    let valuation = parse_f64_safe(row.valuation.as_deref()).unwrap_or(0.0);

    let city = row.city.unwrap_or_default().trim().to_string();
    let district = row
        .district
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    let address = row.address.unwrap_or_default().trim().to_string();
    let lat = parse_f64_safe(row.latitude.as_deref());
    let lng = parse_f64_safe(row.longitude.as_deref());

    Some(TransactionRecord {
        date,
        community,
        price,
        valuation,
        city,
        district,
        lat,
        lng,
        address,
    })
}

/// Load a transaction CSV and drop every row that fails shape validation.
///
/// Rows that the `csv` crate itself cannot deserialize count as skipped
/// alongside rows rejected by `clean_row`; the caller only ever sees clean
/// records plus a `LoadReport` with the tallies.
pub fn load_and_clean(path: &str) -> Result<(Vec<TransactionRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut total_rows = 0usize;
    let mut skipped_rows = 0usize;
    let mut records: Vec<TransactionRecord> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                skipped_rows += 1;
                continue;
            }
        };
        match clean_row(row) {
            Some(rec) => records.push(rec),
            None => skipped_rows += 1,
        }
    }

    let report = LoadReport {
        total_rows,
        valid_rows: records.len(),
        skipped_rows,
    };
    Ok((records, report))
}
