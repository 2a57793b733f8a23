// Test helper utilities and fixtures
#![allow(dead_code)] // not every test binary uses every helper

use chrono::{Days, NaiveDate};
use tidemark::error::CoreResult;
use tidemark::features::FeatureFrame;
use tidemark::market_data::Bar;
use tidemark::signals::{Signal, SignalResult};

/// First date of every synthetic series.
pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

/// Build a bar from a close alone (open = high = low = close).
pub fn bar_at(i: usize, close: f64) -> Bar {
    Bar {
        date: start_date() + Days::new(i as u64),
        open: close,
        high: close,
        low: close,
        close,
        volume: 1_000_000.0,
    }
}

/// Bars from an explicit close path.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes.iter().enumerate().map(|(i, &c)| bar_at(i, c)).collect()
}

/// Deterministic synthetic walk: drift plus alternating shocks. No RNG so
/// every run sees the same path.
pub fn synthetic_bars(start_price: f64, days: usize, drift: f64, volatility: f64) -> Vec<Bar> {
    let dt: f64 = 1.0 / 252.0;
    let mut price = start_price;
    let mut bars = Vec::with_capacity(days);
    for i in 0..days {
        let shock = if i % 2 == 0 {
            volatility * dt.sqrt()
        } else {
            -volatility * dt.sqrt()
        };
        price *= 1.0 + drift * dt + shock;
        bars.push(bar_at(i, price));
    }
    bars
}

/// A signal that always reports the same score and confidence. Lets tests
/// steer the engine without depending on feature math.
pub struct ConstSignal {
    pub signal_name: &'static str,
    pub score: f64,
    pub confidence: f64,
}

impl Signal for ConstSignal {
    fn name(&self) -> &'static str {
        self.signal_name
    }

    fn compute(
        &self,
        _bars: &[Bar],
        _features: &FeatureFrame,
        t: NaiveDate,
    ) -> CoreResult<SignalResult> {
        let mut r = SignalResult::neutral(self.signal_name, t, "scripted");
        r.score = self.score;
        r.confidence = self.confidence;
        Ok(r)
    }
}

/// A signal that switches from one (score, confidence) to another at a
/// given date. Used to force direction changes mid-run.
pub struct StepSignal {
    pub signal_name: &'static str,
    pub switch_at: NaiveDate,
    pub before: (f64, f64),
    pub after: (f64, f64),
}

impl Signal for StepSignal {
    fn name(&self) -> &'static str {
        self.signal_name
    }

    fn compute(
        &self,
        _bars: &[Bar],
        _features: &FeatureFrame,
        t: NaiveDate,
    ) -> CoreResult<SignalResult> {
        let (score, confidence) = if t < self.switch_at { self.before } else { self.after };
        let mut r = SignalResult::neutral(self.signal_name, t, "scripted");
        r.score = score;
        r.confidence = confidence;
        Ok(r)
    }
}

/// Macro for approximate equality
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let diff = ($left - $right).abs();
        assert!(
            diff < $epsilon,
            "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`",
            $left,
            $right,
            diff
        );
    }};
    ($left:expr, $right:expr) => {
        assert_approx_eq!($left, $right, 1e-9);
    };
}
