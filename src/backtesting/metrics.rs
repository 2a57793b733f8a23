// Backtest performance metrics.

use chrono::NaiveDate;
use serde::Serialize;

use super::state::POSITION_EPS;
use super::trade::TradeRecord;

/// One row of the equity curve: mark-to-market value and drawdown from the
/// running peak.
#[derive(Debug, Clone, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    /// Fractional gap from peak equity, <= 0.
    pub drawdown: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestMetrics {
    /// Compound annual growth rate.
    pub cagr: f64,
    /// Annualized Sharpe ratio of daily equity returns.
    pub sharpe: f64,
    /// Most negative drawdown over the run, <= 0.
    pub max_drawdown: f64,
    /// Winning trades over trades with non-zero realized P&L.
    pub win_rate: f64,
    /// Buy/sell records per equity point.
    pub turnover: f64,
    /// Fraction of bars with an open position after a trade. Known
    /// limitation: positions held without trading are not counted, so
    /// this under-reports for buy-and-hold-like runs.
    pub exposure: f64,
    pub total_trades: usize,
    /// Gross profit over gross loss; absent when there are no losses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_factor: Option<f64>,
}

impl BacktestMetrics {
    fn zeroed() -> Self {
        Self {
            cagr: 0.0,
            sharpe: 0.0,
            max_drawdown: 0.0,
            win_rate: 0.0,
            turnover: 0.0,
            exposure: 0.0,
            total_trades: 0,
            profit_factor: None,
        }
    }
}

const TRADING_DAYS: f64 = 252.0;

/// Reduce an equity curve and trade log to summary metrics.
pub fn compute_metrics(equity_curve: &[EquityPoint], trades: &[TradeRecord]) -> BacktestMetrics {
    if equity_curve.is_empty() {
        return BacktestMetrics::zeroed();
    }

    let equity: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();

    // Daily equity returns; rows with a non-positive base are skipped.
    let mut returns = Vec::with_capacity(equity.len().saturating_sub(1));
    for pair in equity.windows(2) {
        if pair[0] > 0.0 {
            returns.push(pair[1] / pair[0] - 1.0);
        }
    }

    // CAGR over calendar time.
    let start_equity = equity[0];
    let end_equity = *equity.last().unwrap_or(&start_equity);
    let days = (equity_curve.last().unwrap().date - equity_curve[0].date).num_days();
    let years = days as f64 / 365.25;
    let cagr = if years > 0.0 && start_equity > 0.0 {
        (end_equity / start_equity).powf(1.0 / years) - 1.0
    } else {
        0.0
    };

    // Annualized Sharpe on daily returns (sample std).
    let sharpe = if returns.len() >= 2 {
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
            / (returns.len() - 1) as f64;
        let std = var.sqrt();
        if std > 0.0 {
            mean / std * TRADING_DAYS.sqrt()
        } else {
            0.0
        }
    } else {
        0.0
    };

    // Max drawdown vs the running maximum.
    let mut peak = f64::NEG_INFINITY;
    let mut max_drawdown = 0.0f64;
    for &e in &equity {
        peak = peak.max(e);
        if peak > 0.0 {
            max_drawdown = max_drawdown.min((e - peak) / peak);
        }
    }

    // Trade-level stats.
    let executed: Vec<&TradeRecord> =
        trades.iter().filter(|t| t.is_executed()).collect();
    let decided: Vec<f64> = executed
        .iter()
        .map(|t| t.realized_pnl)
        .filter(|p| *p != 0.0)
        .collect();
    let wins = decided.iter().filter(|p| **p > 0.0).count();
    let win_rate = if decided.is_empty() {
        0.0
    } else {
        wins as f64 / decided.len() as f64
    };

    let gross_profit: f64 = executed
        .iter()
        .map(|t| t.realized_pnl.max(0.0))
        .sum();
    let gross_loss: f64 = executed
        .iter()
        .map(|t| (-t.realized_pnl).max(0.0))
        .sum();
    let profit_factor = (gross_loss > 0.0).then(|| gross_profit / gross_loss);

    let total_trades = executed.len();
    let num_points = equity_curve.len();
    let turnover = total_trades as f64 / num_points as f64;

    let holding_rows = executed
        .iter()
        .filter(|t| t.position_after.abs() > POSITION_EPS)
        .count();
    let exposure = (holding_rows as f64 / num_points as f64).clamp(0.0, 1.0);

    BacktestMetrics {
        cagr,
        sharpe,
        max_drawdown,
        win_rate,
        turnover,
        exposure,
        total_trades,
        profit_factor,
    }
}
