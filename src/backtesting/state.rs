// Portfolio state: the single owned record the engine mutates, one per run.
//
// Cost-basis accounting over the four position transitions:
//   open     — new basis at the fill price
//   add      — basis grows, average entry price re-weighted
//   reduce   — realized P&L against the average entry, basis shrinks
//              proportionally, average entry unchanged
//   reverse  — the old leg closes in full, the residual opens fresh
// A full close resets both basis fields to zero.

use log::error;

use crate::models::Direction;

/// Share counts below this are treated as flat.
pub const POSITION_EPS: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct PortfolioState {
    pub cash: f64,
    /// Signed share count; negative = short.
    pub position_shares: f64,
    /// Absolute cost basis of the open position, dollars.
    pub entry_value: f64,
    /// Average entry price: entry_value / |position_shares| when open.
    pub entry_price: f64,
    pub peak_equity: f64,
    pub prev_direction: Direction,
    pub prev_confidence: f64,
}

impl PortfolioState {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            position_shares: 0.0,
            entry_value: 0.0,
            entry_price: 0.0,
            peak_equity: initial_capital,
            prev_direction: Direction::Flat,
            prev_confidence: 0.0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position_shares.abs() < POSITION_EPS
    }

    /// Mark-to-market equity at a price.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position_shares * price
    }

    /// Move the position to `desired` shares at `price`, paying `cost`.
    /// Returns the realized P&L of the transition (zero on opens/adds).
    pub fn rebalance(&mut self, desired: f64, price: f64, cost: f64) -> f64 {
        // Invariant guard: a flat book must carry no cost basis. Seeing one
        // is an internal bug; reset defensively and report on the log
        // channel so tests can catch regressions.
        if self.is_flat() && self.entry_value.abs() > POSITION_EPS {
            error!(
                "internal: entry_value {:.4} with flat position; resetting basis",
                self.entry_value
            );
            self.entry_value = 0.0;
            self.entry_price = 0.0;
        }

        let current = self.position_shares;
        let delta = desired - current;
        let mut realized_pnl = 0.0;

        if current.abs() < POSITION_EPS {
            // Open.
            self.entry_value = delta.abs() * price;
            self.entry_price = price;
        } else if delta.signum() == current.signum() {
            // Add to the same direction.
            self.entry_value += delta.abs() * price;
            self.entry_price = self.entry_value / (current.abs() + delta.abs());
        } else if delta.abs() <= current.abs() + POSITION_EPS
            && desired.abs() < current.abs()
        {
            // Reduce or fully close.
            let closed = delta.abs().min(current.abs());
            realized_pnl = if current > 0.0 {
                (price - self.entry_price) * closed
            } else {
                (self.entry_price - price) * closed
            };
            let remaining = current.abs() - closed;
            if remaining < POSITION_EPS {
                self.entry_value = 0.0;
                self.entry_price = 0.0;
            } else {
                // Basis shrinks pro rata; the average entry price holds.
                self.entry_value *= remaining / current.abs();
            }
        } else {
            // Reverse: close the whole leg, then open the residual fresh.
            realized_pnl = if current > 0.0 {
                (price - self.entry_price) * current.abs()
            } else {
                (self.entry_price - price) * current.abs()
            };
            self.entry_value = desired.abs() * price;
            self.entry_price = price;
        }

        // Cost always reduces cash, buys and sells alike.
        self.cash -= delta * price + cost;
        self.position_shares = desired;

        if self.is_flat() {
            self.position_shares = 0.0;
            self.entry_value = 0.0;
            self.entry_price = 0.0;
        }

        realized_pnl
    }
}
