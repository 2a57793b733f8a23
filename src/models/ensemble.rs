// Ensemble model: weighted signal combination behind a regime gate.
//
// Two rules the rest of the pipeline leans on:
//   * Direction is a function of scores only. Confidence feeds sizing and
//     the turnover gate, never the sign of the position.
//   * The regime gate scales magnitude and confidence; regime_weight = 0
//     switches it off entirely, and a more hostile regime can only shrink
//     |weighted_sum| and confidence, never grow them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{CoreConfig, REGIME_SIGNAL};
use crate::signals::SignalResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Flat,
    Short,
}

impl Direction {
    /// -1, 0 or +1.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Flat => 0.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Long => "long",
            Direction::Flat => "flat",
            Direction::Short => "short",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Contributor {
    pub signal: String,
    /// Signed weight × score, before regime scaling.
    pub contribution: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastExplanation {
    /// Signals ranked by |contribution|, largest first, at most five.
    pub top_contributors: Vec<Contributor>,
    pub regime_note: String,
}

/// The ensemble's output at a single bar.
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub direction: Direction,
    pub confidence: f64,
    /// Suggested position fraction in [0, 1]; 0 when flat.
    pub size_hint: f64,
    pub explanation: ForecastExplanation,
}

impl Forecast {
    fn flat(note: &str) -> Self {
        Self {
            direction: Direction::Flat,
            confidence: 0.0,
            size_hint: 0.0,
            explanation: ForecastExplanation {
                top_contributors: Vec::new(),
                regime_note: note.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnsembleModel {
    /// Signal-name → weight over trading signals; empty = equal weights.
    signal_weights: HashMap<String, f64>,
    /// How strongly the regime gate bites, in [0, 1].
    regime_weight: f64,
    /// |weighted score| needed to leave flat.
    threshold: f64,
}

impl EnsembleModel {
    pub fn new(
        signal_weights: HashMap<String, f64>,
        regime_weight: f64,
        threshold: f64,
    ) -> Self {
        Self { signal_weights, regime_weight, threshold }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            config.signal_weights.clone(),
            config.regime_weight,
            config.threshold,
        )
    }

    /// Normalized weights for the trading signals at hand. A missing or
    /// non-positive-sum mapping falls back to equal weights, so scaling all
    /// custom weights by any positive constant changes nothing.
    fn normalized_weights(&self, trading: &[&SignalResult]) -> Vec<f64> {
        if trading.is_empty() {
            return Vec::new();
        }
        if !self.signal_weights.is_empty() {
            let raw: Vec<f64> = trading
                .iter()
                .map(|s| self.signal_weights.get(s.name).copied().unwrap_or(0.0))
                .collect();
            let total: f64 = raw.iter().sum();
            if total > 0.0 {
                return raw.into_iter().map(|w| w / total).collect();
            }
        }
        vec![1.0 / trading.len() as f64; trading.len()]
    }

    /// Combine one bar's signal results into a forecast.
    pub fn combine(&self, signals: &[SignalResult]) -> Forecast {
        if signals.is_empty() {
            return Forecast::flat("no signals available");
        }

        let regime = signals.iter().find(|s| s.name == REGIME_SIGNAL);
        let trading: Vec<&SignalResult> =
            signals.iter().filter(|s| s.name != REGIME_SIGNAL).collect();
        if trading.is_empty() {
            let note = regime
                .map(|r| r.explanation.reason.clone())
                .unwrap_or_else(|| "no trading signals".to_string());
            return Forecast::flat(&note);
        }

        let weights = self.normalized_weights(&trading);

        // Scores only — confidences must not leak into direction.
        let mut weighted_sum: f64 = trading
            .iter()
            .zip(&weights)
            .map(|(s, w)| w * s.score)
            .sum();

        let mut contributors: Vec<Contributor> = trading
            .iter()
            .zip(&weights)
            .map(|(s, w)| Contributor {
                signal: s.name.to_string(),
                contribution: w * s.score,
            })
            .collect();
        contributors.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        contributors.truncate(5);

        // Regime scaling, blended by regime_weight. An unfavorable gate
        // (m < 0.5) halves the raw score; the blend interpolates between
        // "ignore the gate" and that full effect.
        let mut base_confidence: f64 = trading
            .iter()
            .zip(&weights)
            .map(|(s, w)| w * s.confidence)
            .sum();
        let regime_note;
        if let Some(gate) = regime {
            let m = gate.score.clamp(0.0, 1.0);
            let raw_score_scale = if m < 0.5 { 0.5 } else { 1.0 };
            let score_scale =
                (1.0 - self.regime_weight) + self.regime_weight * raw_score_scale;
            weighted_sum *= score_scale;

            let raw_conf_scale = 0.7 + 0.3 * m;
            let conf_scale = (1.0 - self.regime_weight) + self.regime_weight * raw_conf_scale;
            base_confidence *= conf_scale;
            regime_note = gate.explanation.reason.clone();
        } else {
            regime_note = "no regime signal".to_string();
        }
        let confidence = base_confidence.clamp(0.0, 1.0);

        let direction = if weighted_sum > self.threshold {
            Direction::Long
        } else if weighted_sum < -self.threshold {
            Direction::Short
        } else {
            Direction::Flat
        };

        let size_hint = if direction == Direction::Flat {
            0.0
        } else {
            (confidence * weighted_sum.abs()).clamp(0.0, 1.0)
        };

        Forecast {
            direction,
            confidence,
            size_hint,
            explanation: ForecastExplanation {
                top_contributors: contributors,
                regime_note,
            },
        }
    }
}
