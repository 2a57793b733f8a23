// Momentum feature extractors.

use super::{rolling_max, rolling_mean, rolling_min, EPS};

/// n-day log returns: ln(close[i] / close[i-n]).
pub fn log_returns(closes: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    for i in n..closes.len() {
        let base = closes[i - n];
        if base > EPS && closes[i] > EPS {
            out[i] = (closes[i] / base).ln();
        }
    }
    out
}

/// Slope of the `window`-day moving average over `diff` days, normalized
/// by price. The diff span is intentionally asymmetric across windows
/// (5 days for MA20, 10 days for MA60) to match the validated series.
pub fn ma_slope(closes: &[f64], window: usize, diff: usize) -> Vec<f64> {
    let ma = rolling_mean(closes, window);
    let mut out = vec![f64::NAN; closes.len()];
    for i in diff..closes.len() {
        if ma[i].is_nan() || ma[i - diff].is_nan() || closes[i].abs() <= EPS {
            continue;
        }
        out[i] = (ma[i] - ma[i - diff]) / closes[i];
    }
    out
}

/// Signed distance to the nearest rolling breakout boundary over `window`.
/// Positive: measured from the rolling low; negative: from the rolling
/// high. Whichever boundary is closer in magnitude wins.
pub fn breakout_distance(closes: &[f64], window: usize) -> Vec<f64> {
    let rolling_high = rolling_max(closes, window);
    let rolling_low = rolling_min(closes, window);
    let mut out = vec![f64::NAN; closes.len()];
    for i in 0..closes.len() {
        let (hi, lo) = (rolling_high[i], rolling_low[i]);
        if hi.is_nan() || lo.is_nan() || hi.abs() <= EPS || lo.abs() <= EPS {
            continue;
        }
        let dist_from_high = (closes[i] - hi) / hi;
        let dist_from_low = (closes[i] - lo) / lo;
        out[i] = if dist_from_low.abs() < dist_from_high.abs() {
            dist_from_low
        } else {
            dist_from_high
        };
    }
    out
}
