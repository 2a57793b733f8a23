// Feature engine correctness: window semantics, NaN guards, and the
// prefix-stability property that underpins the engine's causality.

mod helpers;

use helpers::{bars_from_closes, synthetic_bars};
use tidemark::features::compute_features;

#[test]
fn empty_series_gives_an_empty_frame() {
    let frame = compute_features(&[]);
    assert!(frame.is_empty());
}

#[test]
fn values_before_the_window_fills_are_nan() {
    let bars = synthetic_bars(100.0, 70, 0.05, 0.2);
    let frame = compute_features(&bars);

    // returns_5d defined from index 5; returns_60d from 60.
    assert!(frame.returns_5d[4].is_nan());
    assert!(!frame.returns_5d[5].is_nan());
    assert!(frame.returns_60d[59].is_nan());
    assert!(!frame.returns_60d[60].is_nan());

    // 20-day stats need 20 closes; realized vol needs 20 returns (21 closes).
    assert!(frame.zscore_close_vs_ma20[18].is_nan());
    assert!(!frame.zscore_close_vs_ma20[19].is_nan());
    assert!(frame.realized_vol_20d[19].is_nan());
    assert!(!frame.realized_vol_20d[20].is_nan());

    // ma_slope_20 needs the MA20 five rows back: first defined at 24.
    assert!(frame.ma_slope_20[23].is_nan());
    assert!(!frame.ma_slope_20[24].is_nan());

    // trend_vs_chop uses the 20 closes strictly before the row.
    assert!(frame.trend_vs_chop[19].is_nan());
    assert!(!frame.trend_vs_chop[20].is_nan());
}

#[test]
fn log_return_matches_hand_value() {
    let mut closes = vec![100.0; 21];
    closes.push(105.0);
    let bars = bars_from_closes(&closes);
    let frame = compute_features(&bars);
    let last = frame.returns_20d.last().unwrap();
    assert_approx_eq!(*last, (105.0f64 / 100.0).ln(), 1e-12);
}

#[test]
fn division_guards_produce_nan_not_panics() {
    // A constant series has zero sigma: z-score and bollinger are
    // undefined, vol_change divides by zero sigma.
    let bars = bars_from_closes(&vec![42.0; 80]);
    let frame = compute_features(&bars);
    assert!(frame.zscore_close_vs_ma20.last().unwrap().is_nan());
    assert!(frame.bollinger_distance.last().unwrap().is_nan());
    assert!(frame.vol_change.last().unwrap().is_nan());
    // Realized vol is exactly zero, not NaN — a defined quantity here.
    assert_eq!(*frame.realized_vol_20d.last().unwrap(), 0.0);
}

#[test]
fn prefix_recompute_matches_full_series() {
    // Features at index t computed from bars[..=t] must equal the values
    // the full-series pass produced at t. This is what lets the engine
    // recompute per bar without changing history.
    let bars = synthetic_bars(100.0, 90, 0.08, 0.25);
    let full = compute_features(&bars);

    for t in [60usize, 75, 89] {
        let prefix = compute_features(&bars[..=t]);
        let a = prefix.row(t);
        let b = full.row(t);
        for (x, y) in [
            (a.returns_5d, b.returns_5d),
            (a.returns_20d, b.returns_20d),
            (a.returns_60d, b.returns_60d),
            (a.ma_slope_20, b.ma_slope_20),
            (a.ma_slope_60, b.ma_slope_60),
            (a.breakout_distance, b.breakout_distance),
            (a.zscore_close_vs_ma20, b.zscore_close_vs_ma20),
            (a.bollinger_distance, b.bollinger_distance),
            (a.reversal_1d, b.reversal_1d),
            (a.reversal_3d, b.reversal_3d),
            (a.realized_vol_20d, b.realized_vol_20d),
            (a.vol_change, b.vol_change),
            (a.trend_vs_chop, b.trend_vs_chop),
        ] {
            match (x.is_nan(), y.is_nan()) {
                (true, true) => {}
                (false, false) => assert_approx_eq!(x, y, 1e-12),
                _ => panic!("NaN mismatch at index {t}: {x} vs {y}"),
            }
        }
    }
}

#[test]
fn bollinger_distance_is_half_at_the_upper_band() {
    // Construct a window whose last close sits exactly two sigmas above
    // the mean: distance = 2σ / 4σ = 0.5.
    let bars = synthetic_bars(100.0, 60, 0.0, 0.3);
    let frame = compute_features(&bars);
    let i = 45;
    let z = frame.zscore_close_vs_ma20[i];
    let b = frame.bollinger_distance[i];
    // Both derive from the same mean and sigma: b == z / 4.
    assert_approx_eq!(b, z / 4.0, 1e-12);
}

#[test]
fn trend_flags_direction() {
    let up: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    let frame = compute_features(&bars_from_closes(&up));
    assert!(*frame.trend_vs_chop.last().unwrap() > 0.9);

    let down: Vec<f64> = (0..40).map(|i| 200.0 - i as f64).collect();
    let frame = compute_features(&bars_from_closes(&down));
    assert!(*frame.trend_vs_chop.last().unwrap() < -0.9);
}
