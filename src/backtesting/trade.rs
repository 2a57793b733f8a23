// Trade record emitted on bars where trading occurred.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    /// Present for completeness; the engine never records hold rows.
    Hold,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub action: TradeAction,
    /// Shares traded, always non-negative; the sign lives in `action`.
    pub quantity: f64,
    /// Execution price (the decision bar's close).
    pub price: f64,
    /// P&L realized by this trade against the position's cost basis.
    /// Zero on opens and adds.
    pub realized_pnl: f64,
    /// Signed position after the trade.
    pub position_after: f64,
}

impl TradeRecord {
    /// True for rows where an order actually executed (buy or sell).
    pub fn is_executed(&self) -> bool {
        matches!(self.action, TradeAction::Buy | TradeAction::Sell)
    }
}
