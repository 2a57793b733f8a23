// Feature engine: pure functions from a bar series to aligned columns.
//
// Storage is columnar — parallel f64 vectors sharing one date axis. A cell
// is NaN until its rolling window is full, and wherever a denominator falls
// below EPS. Signals must treat NaN as "undefined", never as zero. All
// windows are backward-looking: row i is a function of closes[..=i] only.

use chrono::NaiveDate;

use crate::market_data::Bar;

pub mod meanreversion;
pub mod momentum;
pub mod volatility;

/// Denominator guard: anything at or below this produces NaN, not a panic.
pub(crate) const EPS: f64 = 1e-12;

/// Dense feature table aligned to the bar dates.
#[derive(Debug, Clone, Default)]
pub struct FeatureFrame {
    pub dates: Vec<NaiveDate>,
    // momentum
    pub returns_5d: Vec<f64>,
    pub returns_20d: Vec<f64>,
    pub returns_60d: Vec<f64>,
    pub ma_slope_20: Vec<f64>,
    pub ma_slope_60: Vec<f64>,
    pub breakout_distance: Vec<f64>,
    // mean reversion
    pub zscore_close_vs_ma20: Vec<f64>,
    pub bollinger_distance: Vec<f64>,
    pub reversal_1d: Vec<f64>,
    pub reversal_3d: Vec<f64>,
    // volatility / regime
    pub realized_vol_20d: Vec<f64>,
    pub vol_change: Vec<f64>,
    pub trend_vs_chop: Vec<f64>,
}

/// One row of the frame, copied out for signal consumption.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub returns_5d: f64,
    pub returns_20d: f64,
    pub returns_60d: f64,
    pub ma_slope_20: f64,
    pub ma_slope_60: f64,
    pub breakout_distance: f64,
    pub zscore_close_vs_ma20: f64,
    pub bollinger_distance: f64,
    pub reversal_1d: f64,
    pub reversal_3d: f64,
    pub realized_vol_20d: f64,
    pub vol_change: f64,
    pub trend_vs_chop: f64,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Index of the latest row with date <= t, if any.
    pub fn index_at_or_before(&self, t: NaiveDate) -> Option<usize> {
        let n = self.dates.partition_point(|d| *d <= t);
        n.checked_sub(1)
    }

    pub fn row(&self, i: usize) -> FeatureRow {
        FeatureRow {
            date: self.dates[i],
            returns_5d: self.returns_5d[i],
            returns_20d: self.returns_20d[i],
            returns_60d: self.returns_60d[i],
            ma_slope_20: self.ma_slope_20[i],
            ma_slope_60: self.ma_slope_60[i],
            breakout_distance: self.breakout_distance[i],
            zscore_close_vs_ma20: self.zscore_close_vs_ma20[i],
            bollinger_distance: self.bollinger_distance[i],
            reversal_1d: self.reversal_1d[i],
            reversal_3d: self.reversal_3d[i],
            realized_vol_20d: self.realized_vol_20d[i],
            vol_change: self.vol_change[i],
            trend_vs_chop: self.trend_vs_chop[i],
        }
    }

    /// The latest row at or before `t`. This is the only lookup signals use,
    /// so a signal can never read past its decision date.
    pub fn row_at_or_before(&self, t: NaiveDate) -> Option<FeatureRow> {
        self.index_at_or_before(t).map(|i| self.row(i))
    }
}

/// Compute every feature column for a bar series. Returns an empty frame
/// for an empty series.
pub fn compute_features(bars: &[Bar]) -> FeatureFrame {
    if bars.is_empty() {
        return FeatureFrame::default();
    }
    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    FeatureFrame {
        dates,
        returns_5d: momentum::log_returns(&closes, 5),
        returns_20d: momentum::log_returns(&closes, 20),
        returns_60d: momentum::log_returns(&closes, 60),
        ma_slope_20: momentum::ma_slope(&closes, 20, 5),
        ma_slope_60: momentum::ma_slope(&closes, 60, 10),
        breakout_distance: momentum::breakout_distance(&closes, 20),
        zscore_close_vs_ma20: meanreversion::zscore_close_vs_ma(&closes, 20),
        bollinger_distance: meanreversion::bollinger_distance(&closes, 20, 2.0),
        reversal_1d: meanreversion::reversal(&closes, 1),
        reversal_3d: meanreversion::reversal(&closes, 3),
        realized_vol_20d: volatility::realized_vol(&closes, 20),
        vol_change: volatility::vol_change(&closes, 10, 20),
        trend_vs_chop: volatility::trend_vs_chop(&closes, 20),
    }
}

// ---- shared rolling primitives ----

/// Simple day-over-day returns; NaN at index 0 and over a ~zero base.
pub(crate) fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        let prev = values[i - 1];
        if prev.abs() > EPS {
            out[i] = (values[i] - prev) / prev;
        }
    }
    out
}

/// Rolling mean over a full backward window (current value included);
/// NaN until the window fills or while it contains NaN.
pub(crate) fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Rolling sample standard deviation (n − 1 in the denominator, matching
/// the reference series this pipeline was validated against).
pub(crate) fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, sample_std)
}

pub(crate) fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)))
}

pub(crate) fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().fold(f64::INFINITY, |a, &b| a.min(b)))
}

pub(crate) fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    var.sqrt()
}

fn rolling(values: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }
    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = f(slice);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_mean_waits_for_full_window() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!((out[2] - 2.0).abs() < 1e-12);
        assert!((out[3] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn rolling_std_is_sample_std() {
        // std of [1,2,3] with n-1 = 1.0
        let out = rolling_std(&[1.0, 2.0, 3.0], 3);
        assert!((out[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn nan_in_window_poisons_the_cell() {
        let out = rolling_mean(&[f64::NAN, 2.0, 3.0, 4.0], 3);
        assert!(out[2].is_nan());
        assert!(!out[3].is_nan());
    }

    #[test]
    fn row_lookup_never_reads_forward() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let frame = FeatureFrame {
            dates: vec![d(2), d(3), d(5)],
            ..FeatureFrame::default()
        };
        assert_eq!(frame.index_at_or_before(d(1)), None);
        assert_eq!(frame.index_at_or_before(d(3)), Some(1));
        assert_eq!(frame.index_at_or_before(d(4)), Some(1));
        assert_eq!(frame.index_at_or_before(d(9)), Some(2));
    }
}
