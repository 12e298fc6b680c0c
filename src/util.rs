// Utility helpers for parsing, period bucketing, and basic statistics.
//
// This module centralizes all the "dirty" CSV/number/string handling so the
// rest of the code can assume clean, typed values.
use crate::types::PeriodType;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

/// Check that a transaction date has the `YYYYMMDD` shape the pipeline
/// relies on: at least 8 leading ASCII digits with a month in 01..=12.
///
/// Day-of-month is deliberately not validated; period bucketing never looks
/// at it, and the formatter below stays permissive by contract.
pub fn valid_transaction_date(s: &str) -> bool {
    if s.len() < 8 || !s.as_bytes()[..8].iter().all(|b| b.is_ascii_digit()) {
        return false;
    }
    matches!(s[4..6].parse::<u32>(), Ok(m) if (1..=12).contains(&m))
}

/// Map a `YYYYMMDD` date string to its period bucket label.
///
/// - Month mode: `"YYYY-MM"` (month zero-padded).
/// - Quarter mode: `"YYYY-Qn"` with `n = ceil(month / 3)`.
///
/// The function performs no calendar validation: the first four characters
/// are taken as the year verbatim and only the month slice is parsed, so a
/// month of `"13"` yields `"-Q5"`. Month range is enforced at the ingestion
/// boundary instead (see `loader`). Returns `None` only when the input is
/// shorter than six characters or the month slice is not numeric.
pub fn format_period(date: &str, period_type: PeriodType) -> Option<String> {
    let year = date.get(..4)?;
    let month: u32 = date.get(4..6)?.parse().ok()?;
    Some(match period_type {
        PeriodType::Month => format!("{}-{:02}", year, month),
        PeriodType::Quarter => format!("{}-Q{}", year, (month + 2) / 3),
    })
}

/// Convert a period label back to a "months since year zero" ordinal, the
/// independent variable for trend fitting.
///
/// - `"YYYY-MM"` → `year*12 + month − 1`
/// - `"YYYY-Qn"` → `year*12 + (quarter − 1)*3`
pub fn period_to_months(label: &str, period_type: PeriodType) -> Option<i64> {
    let (year, rest) = label.split_once('-')?;
    let year: i64 = year.parse().ok()?;
    match period_type {
        PeriodType::Month => {
            let month: i64 = rest.parse().ok()?;
            Some(year * 12 + month - 1)
        }
        PeriodType::Quarter => {
            let quarter: i64 = rest.strip_prefix('Q')?.parse().ok()?;
            Some(year * 12 + (quarter - 1) * 3)
        }
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// "Upper median" of a list of prices: the element at index `n/2` after an
/// ascending sort, for odd and even counts alike.
///
/// For even counts this is the upper-middle element, not the textbook median
/// (which would average the two middle values). The dashboard this report
/// reproduces aggregated even-sized groups exactly this way, so the quirk is
/// kept rather than corrected; the tests pin it down.
pub fn median_upper(mut v: Vec<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    // Use `partial_cmp` to handle floating-point comparisons and fall back to
    // equality if either side is NaN.
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    v[v.len() / 2]
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
