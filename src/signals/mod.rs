// Trading signals module.
//
// A signal maps (bars up to t, features up to t) to a score and a
// confidence for the decision bar t. Scores are directional in [-1, 1]
// except the regime gate, whose score lives in [0, 1] and expresses how
// hospitable the market state is, not which way to lean.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::error::CoreResult;
use crate::features::FeatureFrame;
use crate::market_data::Bar;

pub mod meanreversion;
pub mod momentum;
pub mod regime;

pub use meanreversion::MeanReversionSignal;
pub use momentum::MomentumSignal;
pub use regime::RegimeFilterSignal;

/// Why a signal says what it says: a one-line reason plus the numeric
/// components that went into the computation.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub reason: String,
    pub components: Vec<(String, f64)>,
}

/// Result of one signal computation at one bar.
#[derive(Debug, Clone, Serialize)]
pub struct SignalResult {
    pub name: &'static str,
    /// Directional strength in [-1, 1]; the regime gate uses [0, 1].
    pub score: f64,
    /// Certainty in [0, 1]. Never influences direction downstream.
    pub confidence: f64,
    /// Midnight UTC of the decision bar. Daily data carries no intraday
    /// meaning; consumers must not read one into this.
    pub timestamp: DateTime<Utc>,
    pub explanation: Explanation,
}

impl SignalResult {
    /// Neutral result for bars where the signal cannot say anything.
    pub fn neutral(name: &'static str, t: NaiveDate, reason: &str) -> Self {
        Self {
            name,
            score: 0.0,
            confidence: 0.0,
            timestamp: bar_timestamp(t),
            explanation: Explanation { reason: reason.to_string(), components: Vec::new() },
        }
    }
}

/// UTC timestamp attached to a daily bar.
pub fn bar_timestamp(t: NaiveDate) -> DateTime<Utc> {
    t.and_time(NaiveTime::MIN).and_utc()
}

/// Core capability set shared by all signals.
///
/// Implementations must only consult features at dates <= `t`; the frame's
/// `row_at_or_before` lookup is the sanctioned access path.
pub trait Signal: Send + Sync {
    fn name(&self) -> &'static str;

    fn compute(
        &self,
        bars: &[Bar],
        features: &FeatureFrame,
        t: NaiveDate,
    ) -> CoreResult<SignalResult>;
}

/// The three built-in signals in canonical order: trading signals first,
/// then the regime gate.
pub fn builtin_signals() -> Vec<Box<dyn Signal>> {
    vec![
        Box::new(MomentumSignal::new()),
        Box::new(MeanReversionSignal::new()),
        Box::new(RegimeFilterSignal::new()),
    ]
}

/// Clip helper used by every signal; keeps scores inside their contract
/// range even under pathological feature values.
pub(crate) fn clip(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}
