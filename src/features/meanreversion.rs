// Mean reversion feature extractors.

use super::{pct_change, rolling_mean, rolling_std, EPS};

/// Z-score of close vs its `window`-day moving average.
pub fn zscore_close_vs_ma(closes: &[f64], window: usize) -> Vec<f64> {
    let ma = rolling_mean(closes, window);
    let std = rolling_std(closes, window);
    closes
        .iter()
        .zip(ma.iter().zip(std.iter()))
        .map(|(&c, (&m, &s))| {
            if m.is_nan() || s.is_nan() || s <= EPS {
                f64::NAN
            } else {
                (c - m) / s
            }
        })
        .collect()
}

/// Distance from the band midpoint, normalized by band width (upper minus
/// lower, i.e. 2·num_std·σ each side). ±0.5 sits on a band.
pub fn bollinger_distance(closes: &[f64], window: usize, num_std: f64) -> Vec<f64> {
    let ma = rolling_mean(closes, window);
    let std = rolling_std(closes, window);
    closes
        .iter()
        .zip(ma.iter().zip(std.iter()))
        .map(|(&c, (&m, &s))| {
            let band_width = 2.0 * num_std * s;
            if m.is_nan() || s.is_nan() || band_width <= EPS {
                f64::NAN
            } else {
                (c - m) / band_width
            }
        })
        .collect()
}

/// Negative of the n-day return: bets on short-horizon anti-autocorrelation.
pub fn reversal(closes: &[f64], n: usize) -> Vec<f64> {
    if n == 1 {
        return pct_change(closes).into_iter().map(|r| -r).collect();
    }
    let mut out = vec![f64::NAN; closes.len()];
    for i in n..closes.len() {
        let base = closes[i - n];
        if base.abs() > EPS {
            out[i] = -(closes[i] / base - 1.0);
        }
    }
    out
}
