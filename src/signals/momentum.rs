// Momentum ("trend") signal: is price gaining strength vs recent history?
//
// Averages tanh-squashed momentum features. The squash factor of 10
// emphasizes the extremes — a 5% sixty-day return already reads as a
// strong trend. Confidence mixes trend strength with cross-feature
// agreement so one outlier feature cannot fake conviction.

use chrono::NaiveDate;

use crate::config::MOMENTUM_SIGNAL;
use crate::error::CoreResult;
use crate::features::FeatureFrame;
use crate::market_data::Bar;

use super::{clip, bar_timestamp, Explanation, Signal, SignalResult};

pub struct MomentumSignal;

impl MomentumSignal {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MomentumSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl Signal for MomentumSignal {
    fn name(&self) -> &'static str {
        MOMENTUM_SIGNAL
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
                "insufficient data for momentum signal",
            ));
        };

        let candidates = [
            ("returns_5d", row.returns_5d),
            ("returns_20d", row.returns_20d),
            ("returns_60d", row.returns_60d),
            ("ma_slope_20", row.ma_slope_20),
            ("ma_slope_60", row.ma_slope_60),
            ("breakout_distance", row.breakout_distance),
        ];
        let available: Vec<(&str, f64)> = candidates
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|&(n, v)| (n, v))
            .collect();

        if available.is_empty() {
            return Ok(SignalResult::neutral(
                self.name(),
                t,
                "all momentum features are NaN",
            ));
        }

        let normalized: Vec<f64> = available.iter().map(|(_, v)| (v * 10.0).tanh()).collect();
        let score = clip(
            normalized.iter().sum::<f64>() / normalized.len() as f64,
            -1.0,
            1.0,
        );

        // Agreement: low spread across the squashed features means the
        // trend shows up everywhere, not just in one lookback.
        let mean = normalized.iter().sum::<f64>() / normalized.len() as f64;
        let spread = (normalized.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / normalized.len() as f64)
            .sqrt();
        let consistency = 1.0 - (spread / 2.0).min(1.0);
        let confidence = clip(0.7 * score.abs() + 0.3 * consistency, 0.0, 1.0);

        // Reason: the strongest few components with their raw values.
        let mut ranked = available.clone();
        ranked.sort_by(|a, b| {
            (b.1 * 10.0)
                .tanh()
                .abs()
                .partial_cmp(&(a.1 * 10.0).tanh().abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let reason = ranked
            .iter()
            .take(3)
            .map(|(n, v)| format!("{n}={v:.4}"))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(SignalResult {
            name: self.name(),
            score,
            confidence,
            timestamp: bar_timestamp(t),
            explanation: Explanation {
                reason,
                components: available
                    .iter()
                    .map(|(n, v)| (n.to_string(), *v))
                    .collect(),
            },
        })
    }
}
