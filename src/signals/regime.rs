// Regime filter ("gate").
//
// Not a directional opinion: a scalar in [0, 1] describing how hospitable
// the market state is to taking any risk at all. The ensemble uses it to
// scale scores and confidences; it never flips a direction on its own.
//
// Favorable: moderate volatility and a clean trend. Unfavorable: dead or
// crisis-level volatility, or chop.

use chrono::NaiveDate;

use crate::config::REGIME_SIGNAL;
use crate::error::CoreResult;
use crate::features::FeatureFrame;
use crate::market_data::Bar;

use super::{clip, bar_timestamp, Explanation, Signal, SignalResult};

pub struct RegimeFilterSignal;

impl RegimeFilterSignal {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RegimeFilterSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Score the annualized vol level. Sweet spot is 10%-50%.
fn vol_score(vol: f64) -> f64 {
    if vol < 0.05 {
        0.3 // stagnant
    } else if vol > 0.8 {
        0.2 // crisis / unstable
    } else if (0.1..=0.5).contains(&vol) {
        1.0
    } else {
        0.6 // acceptable but not ideal
    }
}

/// Score trend clarity from |trend_vs_chop|; R² of 0.5 already saturates.
fn trend_score(trend_strength: f64) -> f64 {
    (trend_strength * 2.0).min(1.0)
}

/// Score the vol trajectory: calming markets get a bonus, heating ones a
/// penalty. The raw value can exceed 1; the combined score is clipped.
fn vol_change_score(vol_change: f64) -> f64 {
    if vol_change < -0.2 {
        1.2
    } else if vol_change > 0.3 {
        0.5
    } else {
        1.0
    }
}

impl Signal for RegimeFilterSignal {
    fn name(&self) -> &'static str {
        REGIME_SIGNAL
    }

    fn compute(
        &self,
        _bars: &[Bar],
        features: &FeatureFrame,
        t: NaiveDate,
    ) -> CoreResult<SignalResult> {
        let Some(row) = features.row_at_or_before(t) else {
            return Ok(SignalResult::neutral(
                self.name(),
                t,
                "insufficient data for regime filter",
            ));
        };

        let vol = row.realized_vol_20d.is_finite().then_some(row.realized_vol_20d);
        let trend_strength = row.trend_vs_chop.is_finite().then(|| row.trend_vs_chop.abs());
        let vol_change = row.vol_change.is_finite().then_some(row.vol_change);

        if vol.is_none() && trend_strength.is_none() {
            // A half-open gate: nothing known about the regime, neither
            // favorable nor hostile.
            return Ok(SignalResult {
                name: self.name(),
                score: 0.5,
                confidence: 0.0,
                timestamp: bar_timestamp(t),
                explanation: Explanation {
                    reason: "missing regime features".to_string(),
                    components: Vec::new(),
                },
            });
        }

        let mut components = Vec::new();
        let mut scores = Vec::new();
        if let Some(v) = vol {
            scores.push(vol_score(v));
            components.push(("realized_vol_20d".to_string(), v));
        }
        if let Some(ts) = trend_strength {
            scores.push(trend_score(ts));
            components.push(("trend_strength".to_string(), ts));
        }
        if let Some(vc) = vol_change {
            scores.push(vol_change_score(vc));
            components.push(("vol_change".to_string(), vc));
        }
        let score = clip(scores.iter().sum::<f64>() / scores.len() as f64, 0.0, 1.0);

        // Confidence reflects regime clarity, and needs both pillars.
        let confidence = match (vol, trend_strength) {
            (Some(v), Some(ts)) => {
                if (0.15..=0.4).contains(&v) && ts > 0.3 {
                    0.9
                } else if vol_score(v) < 0.4 || trend_score(ts) < 0.3 {
                    0.3
                } else {
                    0.6
                }
            }
            _ => 0.5,
        };

        let vol_desc = match vol {
            Some(v) if v < 0.1 => "low vol",
            Some(v) if v > 0.6 => "high vol",
            Some(_) => "moderate vol",
            None => "vol unknown",
        };
        let trend_desc = match trend_strength {
            Some(ts) if ts > 0.5 => "strong trend",
            Some(ts) if ts < 0.2 => "choppy",
            Some(_) => "weak trend",
            None => "trend unknown",
        };
        let reason = format!("{vol_desc}, {trend_desc} (gate={score:.2})");

        Ok(SignalResult {
            name: self.name(),
            score,
            confidence,
            timestamp: bar_timestamp(t),
            explanation: Explanation { reason, components },
        })
    }
}
