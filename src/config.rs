// Run configuration and strategy presets.
//
// One immutable CoreConfig value is plumbed through the whole pipeline:
// ensemble, sizing, costs, constraints and the engine all read from it.
// There are no process-wide settings and nothing re-reads configuration
// mid-run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Canonical signal names used as weight keys.
pub const MOMENTUM_SIGNAL: &str = "momentum";
pub const MEAN_REVERSION_SIGNAL: &str = "mean_reversion";
pub const REGIME_SIGNAL: &str = "regime";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Signal-name → weight for trading signals. Empty map means equal
    /// weights; non-empty maps are renormalized so trading weights sum to 1.
    pub signal_weights: HashMap<String, f64>,
    /// Strength of the regime gate's effect on score and confidence, in [0, 1].
    pub regime_weight: f64,
    /// Absolute weighted score needed to leave `flat`.
    pub threshold: f64,
    /// Cap on |position fraction|.
    pub max_leverage: f64,
    /// Drawdown stop, negative (e.g. -0.2 halts at -20% from peak). None = off.
    pub max_drawdown: Option<f64>,
    /// Single-day loss stop, negative. None = off.
    pub max_daily_loss: Option<f64>,
    /// Minimum |Δconfidence| to trade when direction is unchanged.
    pub turnover_threshold: f64,
    /// Target DAILY volatility for sizing (0.01 = 1% daily).
    pub target_vol_daily: f64,
    /// Cap on position size as a fraction of equity.
    pub max_position_size: f64,
    /// Floor on realized vol used in sizing, prevents division blow-ups.
    pub vol_floor: f64,
    /// Fixed per-trade cost in basis points.
    pub fixed_bps: f64,
    /// Slippage coefficient for the square-root impact term.
    pub slippage_factor: f64,
    /// Starting equity in dollars.
    pub initial_capital: f64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            signal_weights: HashMap::new(), // empty = equal weights
            regime_weight: 0.3,
            threshold: 0.1,
            max_leverage: 1.0,
            max_drawdown: None,  // stop disabled by default
            max_daily_loss: None,
            turnover_threshold: 0.1,
            target_vol_daily: 0.01, // 1% daily vol target
            max_position_size: 1.0,
            vol_floor: 1e-6,
            fixed_bps: 5.0,
            slippage_factor: 1e-3,
            initial_capital: 100_000.0,
        }
    }
}

impl CoreConfig {
    /// Validate parameters at run entry. Rejects non-finite values and
    /// nonsensical ranges with `InvalidInput`; weight maps summing to ≤ 0
    /// are legal (the ensemble falls back to equal weights).
    pub fn validate(&self) -> CoreResult<()> {
        let finite = [
            ("regime_weight", self.regime_weight),
            ("threshold", self.threshold),
            ("max_leverage", self.max_leverage),
            ("turnover_threshold", self.turnover_threshold),
            ("target_vol_daily", self.target_vol_daily),
            ("max_position_size", self.max_position_size),
            ("vol_floor", self.vol_floor),
            ("fixed_bps", self.fixed_bps),
            ("slippage_factor", self.slippage_factor),
            ("initial_capital", self.initial_capital),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(CoreError::InvalidInput(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        for (name, value) in self.signal_weights.iter() {
            if !value.is_finite() {
                return Err(CoreError::InvalidInput(format!(
                    "signal weight '{name}' must be finite, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.regime_weight) {
            return Err(CoreError::InvalidInput(format!(
                "regime_weight must be in [0, 1], got {}",
                self.regime_weight
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(CoreError::InvalidInput(format!(
                "threshold must be in [0, 1], got {}",
                self.threshold
            )));
        }
        if self.initial_capital <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if let Some(dd) = self.max_drawdown {
            if !dd.is_finite() || dd >= 0.0 {
                return Err(CoreError::InvalidInput(format!(
                    "max_drawdown must be a finite negative fraction, got {dd}"
                )));
            }
        }
        if let Some(dl) = self.max_daily_loss {
            if !dl.is_finite() || dl >= 0.0 {
                return Err(CoreError::InvalidInput(format!(
                    "max_daily_loss must be a finite negative fraction, got {dl}"
                )));
            }
        }
        Ok(())
    }
}

/// Look up a named preset. Unknown names (and None) fall back to the
/// default bundle; the warnings vec carries a note when that happens.
pub fn preset(name: Option<&str>) -> (CoreConfig, Vec<String>) {
    let mut warnings = Vec::new();
    let config = match name {
        None | Some("default") => CoreConfig::default(),
        Some("trend") => CoreConfig {
            signal_weights: HashMap::from([
                (MOMENTUM_SIGNAL.to_string(), 0.6),
                (MEAN_REVERSION_SIGNAL.to_string(), 0.2),
            ]),
            regime_weight: 0.2,
            threshold: 0.15,
            ..CoreConfig::default()
        },
        Some("mean_reversion") => CoreConfig {
            signal_weights: HashMap::from([
                (MOMENTUM_SIGNAL.to_string(), 0.2),
                (MEAN_REVERSION_SIGNAL.to_string(), 0.6),
            ]),
            regime_weight: 0.2,
            threshold: 0.08,
            ..CoreConfig::default()
        },
        // Equal weights, higher bar to trade
        Some("conservative") => CoreConfig {
            regime_weight: 0.2,
            threshold: 0.2,
            ..CoreConfig::default()
        },
        Some(other) => {
            warnings.push(format!("Unknown preset '{other}', using 'default'"));
            CoreConfig::default()
        }
    };
    (config, warnings)
}

/// Names accepted by [`preset`] without a fallback warning.
pub fn preset_names() -> [&'static str; 4] {
    ["default", "trend", "mean_reversion", "conservative"]
}
