// Transaction cost model: fixed fees plus square-root market impact.

use crate::config::CoreConfig;

#[derive(Debug, Clone)]
pub struct TransactionCostModel {
    /// Fixed cost in basis points of traded notional.
    pub fixed_bps: f64,
    /// Coefficient on the √(participation) impact term.
    pub slippage_factor: f64,
}

impl TransactionCostModel {
    pub fn new(fixed_bps: f64, slippage_factor: f64) -> Self {
        Self { fixed_bps, slippage_factor }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.fixed_bps, config.slippage_factor)
    }

    /// Total dollar cost of a trade.
    ///
    /// fee  = notional · bps / 10000
    /// slip = factor · (vol · price) · √(notional / (volume · price)) · notional
    ///
    /// The slip term scales with how large the trade is relative to the
    /// day's volume. Returns 0 for non-positive notional or price; always
    /// non-negative otherwise.
    pub fn compute_cost(
        &self,
        trade_notional: f64,
        price: f64,
        day_volume: f64,
        annual_vol: f64,
    ) -> f64 {
        if trade_notional <= 0.0 || price <= 0.0 {
            return 0.0;
        }
        let fixed_cost = trade_notional * (self.fixed_bps / 10_000.0);
        let slippage_cost = if day_volume > 0.0 && annual_vol > 0.0 {
            let vol_price = annual_vol * price;
            let trade_ratio = trade_notional / (day_volume * price);
            self.slippage_factor * vol_price * trade_ratio.sqrt() * trade_notional
        } else {
            0.0
        };
        fixed_cost + slippage_cost
    }

    /// The same cost expressed in basis points of the traded notional.
    pub fn compute_cost_bps(
        &self,
        trade_notional: f64,
        price: f64,
        day_volume: f64,
        annual_vol: f64,
    ) -> f64 {
        if trade_notional <= 0.0 {
            return 0.0;
        }
        self.compute_cost(trade_notional, price, day_volume, annual_vol) / trade_notional
            * 10_000.0
    }
}

impl Default for TransactionCostModel {
    fn default() -> Self {
        Self {
            fixed_bps: 5.0,       // 5 bps per trade
            slippage_factor: 1e-3,
        }
    }
}
