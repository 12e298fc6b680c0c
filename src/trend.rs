use crate::types::{PeriodType, PriceHistoryRow, TrendLine};
use crate::util::period_to_months;

/// Ordinary least squares over one community's aggregated price series.
///
/// The independent variable is the period ordinal (months since year zero,
/// see `util::period_to_months`) shifted so the earliest observation sits at
/// x = 0. With `use_log` the fit runs on ln(price), which turns steady
/// percentage growth into a straight line; observations with price <= 0 are
/// dropped first since their log is undefined.
///
/// Fewer than two usable observations is not an error: the caller gets a
/// zero-valued `TrendLine` tagged with the requested transform flag and must
/// read slope = 0 / r2 = 0 as "insufficient data".
pub fn fit_trend_line(
    prices: &[f64],
    periods: &[String],
    period_type: PeriodType,
    use_log: bool,
) -> TrendLine {
    let mut xs: Vec<f64> = Vec::with_capacity(prices.len());
    let mut ys: Vec<f64> = Vec::with_capacity(prices.len());
    for (price, period) in prices.iter().zip(periods) {
        if use_log && *price <= 0.0 {
            continue;
        }
        let Some(ordinal) = period_to_months(period, period_type) else {
            // An unparseable label poisons the whole fit; treat it like
            // insufficient data rather than guessing an ordinal.
            return TrendLine::degenerate(use_log);
        };
        xs.push(ordinal as f64);
        ys.push(if use_log { price.ln() } else { *price });
    }
    if xs.len() < 2 {
        return TrendLine::degenerate(use_log);
    }

    let min_x = xs.iter().copied().fold(f64::MAX, f64::min);
    for x in &mut xs {
        *x -= min_x;
    }

    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = xs.iter().zip(&ys).map(|(x, y)| x * y).sum();
    let sum_xx: f64 = xs.iter().map(|x| x * x).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return TrendLine::degenerate(use_log);
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let y_mean = sum_y / n;
    let ss_total: f64 = ys.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_residual: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| {
            let fitted = slope * x + intercept;
            (y - fitted).powi(2)
        })
        .sum();
    // A flat series has no variance to explain. The line reproduces it
    // exactly, so report a perfect fit; anything else gets 0.
    let r2 = if ss_total.abs() < f64::EPSILON {
        if ss_residual.abs() < f64::EPSILON {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_residual / ss_total
    };

    TrendLine {
        slope,
        intercept,
        r2,
        is_log_transformed: use_log,
    }
}

/// Evaluate the fitted line back into price units for a community.
///
/// Prices are `exp(intercept + slope * x)` when the fit ran in log space and
/// the plain line output otherwise. x counts ordinal months from the
/// community's first observed period, and values are written only for rows
/// inside the span from its first to its last observation — periods where
/// only other communities traded stay unfit.
pub fn apply_trend_values(
    history: &mut [PriceHistoryRow],
    community: &str,
    line: &TrendLine,
    period_type: PeriodType,
) {
    let observed: Vec<i64> = history
        .iter()
        .filter(|row| row.prices.contains_key(community))
        .filter_map(|row| period_to_months(&row.period, period_type))
        .collect();
    let (Some(&first), Some(&last)) = (observed.first(), observed.last()) else {
        return;
    };

    for row in history.iter_mut() {
        let Some(ordinal) = period_to_months(&row.period, period_type) else {
            continue;
        };
        if ordinal < first || ordinal > last {
            continue;
        }
        let x = (ordinal - first) as f64;
        let fitted = line.intercept + line.slope * x;
        let value = if line.is_log_transformed {
            fitted.exp()
        } else {
            fitted
        };
        row.trend.insert(community.to_string(), value);
    }
}
