// Mean reversion ("pullback") signal.
//
// A stretched z-score vs the 20-day average is expected to snap back:
// overbought (z >> 0) produces a negative score, oversold a positive one.
// Falls back to Bollinger distance when the z-score is undefined, and
// blends in short-horizon reversal features when they exist.

use chrono::NaiveDate;

use crate::config::MEAN_REVERSION_SIGNAL;
use crate::error::CoreResult;
use crate::features::FeatureFrame;
use crate::market_data::Bar;

use super::{clip, bar_timestamp, Explanation, Signal, SignalResult};

pub struct MeanReversionSignal;

impl MeanReversionSignal {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MeanReversionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl Signal for MeanReversionSignal {
    fn name(&self) -> &'static str {
        MEAN_REVERSION_SIGNAL
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
                "insufficient data for mean reversion signal",
            ));
        };

        let mut components = Vec::new();
        // Primary: z-score vs MA20. Fallback: Bollinger distance scaled to a
        // z-like magnitude (half a band width ≈ one standard deviation pair).
        let zscore = if row.zscore_close_vs_ma20.is_finite() {
            components.push(("zscore_close_vs_ma20".to_string(), row.zscore_close_vs_ma20));
            Some(row.zscore_close_vs_ma20)
        } else if row.bollinger_distance.is_finite() {
            components.push(("bollinger_distance".to_string(), row.bollinger_distance));
            Some(row.bollinger_distance * 2.0)
        } else {
            None
        };

        let Some(z) = zscore else {
            return Ok(SignalResult::neutral(
                self.name(),
                t,
                "missing mean reversion features",
            ));
        };

        // High z (overbought) → negative score (sell). The /2 softens the
        // squash so |z| = 2 maps to roughly ±0.76 rather than saturating.
        let mut score = clip((-z / 2.0).tanh(), -1.0, 1.0);

        // A |z| of 3 saturates confidence.
        let confidence = (z.abs() / 3.0).min(1.0);

        // Blend in the short-horizon reversal features when present.
        let reversals: Vec<f64> = [row.reversal_1d, row.reversal_3d]
            .into_iter()
            .filter(|v| v.is_finite())
            .collect();
        if !reversals.is_empty() {
            let reversal_avg = reversals.iter().sum::<f64>() / reversals.len() as f64;
            score = clip(0.7 * score + 0.3 * (reversal_avg * 10.0).tanh(), -1.0, 1.0);
            components.push(("reversal_avg".to_string(), reversal_avg));
        }

        let regime_note = if z > 1.0 {
            "overbought"
        } else if z < -1.0 {
            "oversold"
        } else {
            "neutral"
        };
        let reason = format!("zscore={z:.2} vs MA20 ({regime_note})");

        Ok(SignalResult {
            name: self.name(),
            score,
            confidence,
            timestamp: bar_timestamp(t),
            explanation: Explanation { reason, components },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureFrame;

    fn frame_with_row(z: f64, r1: f64, r3: f64) -> FeatureFrame {
        FeatureFrame {
            dates: vec![NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()],
            returns_5d: vec![f64::NAN],
            returns_20d: vec![f64::NAN],
            returns_60d: vec![f64::NAN],
            ma_slope_20: vec![f64::NAN],
            ma_slope_60: vec![f64::NAN],
            breakout_distance: vec![f64::NAN],
            zscore_close_vs_ma20: vec![z],
            bollinger_distance: vec![f64::NAN],
            reversal_1d: vec![r1],
            reversal_3d: vec![r3],
            realized_vol_20d: vec![f64::NAN],
            vol_change: vec![f64::NAN],
            trend_vs_chop: vec![f64::NAN],
        }
    }

    #[test]
    fn overbought_means_sell() {
        let t = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let frame = frame_with_row(2.5, f64::NAN, f64::NAN);
        let r = MeanReversionSignal::new().compute(&[], &frame, t).unwrap();
        assert!(r.score < 0.0, "score {}", r.score);
        assert!((r.confidence - 2.5 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn z_of_three_saturates_confidence() {
        let t = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let frame = frame_with_row(-4.0, f64::NAN, f64::NAN);
        let r = MeanReversionSignal::new().compute(&[], &frame, t).unwrap();
        assert_eq!(r.confidence, 1.0);
        assert!(r.score > 0.0); // oversold → buy
    }

    #[test]
    fn reversal_features_blend_into_score() {
        let t = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let plain = MeanReversionSignal::new()
            .compute(&[], &frame_with_row(1.0, f64::NAN, f64::NAN), t)
            .unwrap();
        let blended = MeanReversionSignal::new()
            .compute(&[], &frame_with_row(1.0, 0.05, 0.05), t)
            .unwrap();
        // Positive reversal average pulls the score up vs the plain case.
        assert!(blended.score > plain.score);
    }
}
