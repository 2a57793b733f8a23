// Volatility and regime feature extractors.

use super::{pct_change, rolling_std, EPS};

/// Trading days per year used for annualization throughout.
pub const TRADING_DAYS: f64 = 252.0;

/// `window`-day rolling realized volatility of daily returns, annualized.
pub fn realized_vol(closes: &[f64], window: usize) -> Vec<f64> {
    let returns = pct_change(closes);
    rolling_std(&returns, window)
        .into_iter()
        .map(|s| s * TRADING_DAYS.sqrt())
        .collect()
}

/// Relative change of short-window vs long-window return volatility:
/// (σ_short − σ_long) / σ_long.
pub fn vol_change(closes: &[f64], short_window: usize, long_window: usize) -> Vec<f64> {
    let returns = pct_change(closes);
    let vol_short = rolling_std(&returns, short_window);
    let vol_long = rolling_std(&returns, long_window);
    vol_short
        .iter()
        .zip(vol_long.iter())
        .map(|(&s, &l)| {
            if s.is_nan() || l.is_nan() || l <= EPS {
                f64::NAN
            } else {
                (s - l) / l
            }
        })
        .collect()
}

/// Trend strength proxy: sign(slope) · R² of an OLS fit of the previous
/// `window` closes on their index, in [-1, 1]. Near ±1 means a clean
/// trend, near 0 means chop. The window is strictly backward — the
/// current bar is excluded.
pub fn trend_vs_chop(closes: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    for i in window..closes.len() {
        let y = &closes[i - window..i];
        out[i] = signed_r_squared(y);
    }
    out
}

/// sign(slope) · R² of y on 0..n. Returns 0.0 when y has no variation.
fn signed_r_squared(y: &[f64]) -> f64 {
    let n = y.len() as f64;
    let first = y[0];
    if y.iter().all(|&v| (v - first).abs() <= EPS) {
        return 0.0; // not enough variation to call a trend
    }
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = y.iter().sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (i, &v) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        let dy = v - y_mean;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= EPS || syy <= EPS {
        return 0.0;
    }
    let r = sxy / (sxx * syy).sqrt();
    let r_squared = r * r;
    if sxy / sxx > 0.0 {
        r_squared
    } else {
        -r_squared
    }
}
