// Portfolio risk constraints: leverage cap, loss stops, turnover gate.

use log::warn;

use crate::config::CoreConfig;
use crate::models::Direction;

#[derive(Debug, Clone)]
pub struct RiskConstraints {
    /// Cap on |position fraction|.
    pub max_leverage: f64,
    /// Drawdown stop vs peak equity, negative. None = off.
    pub max_drawdown: Option<f64>,
    /// Single-day return stop, negative. None = off.
    pub max_daily_loss: Option<f64>,
    /// Minimum |Δconfidence| to re-trade an unchanged direction.
    pub turnover_threshold: f64,
}

impl RiskConstraints {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            max_leverage: config.max_leverage,
            max_drawdown: config.max_drawdown,
            max_daily_loss: config.max_daily_loss,
            turnover_threshold: config.turnover_threshold,
        }
    }

    /// Clamp a signed position fraction to the leverage cap.
    pub fn apply_leverage(&self, position_size: f64) -> f64 {
        if position_size.abs() > self.max_leverage {
            position_size.signum() * self.max_leverage
        } else {
            position_size
        }
    }

    /// True when the drawdown from peak equity breaches the stop.
    pub fn drawdown_stop_triggered(&self, current_equity: f64, peak_equity: f64) -> bool {
        let Some(max_drawdown) = self.max_drawdown else {
            return false;
        };
        if peak_equity <= 0.0 {
            return false;
        }
        let drawdown = (current_equity - peak_equity) / peak_equity;
        if drawdown <= max_drawdown {
            warn!(
                "drawdown stop triggered: {:.2}% <= {:.2}%",
                drawdown * 100.0,
                max_drawdown * 100.0
            );
            return true;
        }
        false
    }

    /// True when a single-day equity return breaches the stop.
    pub fn daily_loss_stop_triggered(&self, daily_return: f64) -> bool {
        let Some(max_daily_loss) = self.max_daily_loss else {
            return false;
        };
        if daily_return <= max_daily_loss {
            warn!(
                "daily loss stop triggered: {:.2}% <= {:.2}%",
                daily_return * 100.0,
                max_daily_loss * 100.0
            );
            return true;
        }
        false
    }

    /// Turnover gate: trade on any direction change, otherwise only when
    /// confidence moved by at least the threshold. A confidence creep from
    /// 0 to just under the threshold with an unchanged direction does not
    /// trade.
    pub fn should_trade(
        &self,
        new_direction: Direction,
        prev_direction: Direction,
        new_confidence: f64,
        prev_confidence: f64,
    ) -> bool {
        if new_direction != prev_direction {
            return true;
        }
        (new_confidence - prev_confidence).abs() >= self.turnover_threshold
    }
}
