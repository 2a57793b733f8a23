// Backtest engine: drives bars in date order through the full pipeline.
//
// Causality is the load-bearing invariant: at step t the engine hands
// signals only bars[..=t] and a feature frame computed from exactly those
// bars. Nothing downstream can see past the decision bar, so replacing
// future bars cannot change anything already emitted.
//
// One bar = one step: warm-up check, features, signals, ensemble, sizing,
// turnover gate, trade + accounting, mark-to-market, then the loss stops.
// A stop halts the loop only after the triggering bar's equity point is
// recorded. The run is deterministic — no clock, no RNG.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::features::{compute_features, volatility::TRADING_DAYS};
use crate::market_data::Bar;
use crate::models::{Direction, EnsembleModel, Forecast};
use crate::portfolio::{compute_position_size, RiskConstraints};
use crate::signals::{builtin_signals, Signal, SignalResult};

use super::costs::TransactionCostModel;
use super::metrics::{compute_metrics, BacktestMetrics, EquityPoint};
use super::state::{PortfolioState, POSITION_EPS};
use super::trade::{TradeAction, TradeRecord};

/// Bars of history required before the engine will trade.
pub const WARMUP_BARS: usize = 60;

/// Fallback annualized vol when the trailing estimate is undefined.
const DEFAULT_ANNUAL_VOL: f64 = 0.2;

/// Why a run stopped early. Designed halts, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    DrawdownStop,
    DailyLossStop,
    Cancelled,
}

/// Complete result of a backtest run.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestOutput {
    /// One row per processed bar, strictly increasing dates.
    pub equity_curve: Vec<EquityPoint>,
    /// Rows only for bars where trading occurred, strictly increasing dates.
    pub trades: Vec<TradeRecord>,
    pub metrics: BacktestMetrics,
    /// Present when the run stopped at a designed halt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halt: Option<HaltReason>,
}

pub struct BacktestEngine {
    config: CoreConfig,
    ensemble: EnsembleModel,
    constraints: RiskConstraints,
    cost_model: TransactionCostModel,
    signals: Vec<Box<dyn Signal>>,
}

impl BacktestEngine {
    /// Build an engine with the three built-in signals. Rejects invalid
    /// configuration up front; nothing re-reads config mid-run.
    pub fn new(config: CoreConfig) -> CoreResult<Self> {
        Self::with_signals(config, builtin_signals())
    }

    /// Build an engine around a custom signal set. Mainly for tests and
    /// experiments; production runs use [`BacktestEngine::new`].
    pub fn with_signals(
        config: CoreConfig,
        signals: Vec<Box<dyn Signal>>,
    ) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            ensemble: EnsembleModel::from_config(&config),
            constraints: RiskConstraints::from_config(&config),
            cost_model: TransactionCostModel::from_config(&config),
            config,
            signals,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Run over a full bar series.
    pub fn run(&self, bars: &[Bar]) -> CoreResult<BacktestOutput> {
        let cancel = AtomicBool::new(false);
        self.run_cancellable(bars, &cancel)
    }

    /// Run over the sub-range of `bars` with dates in `[start, end]`.
    pub fn run_range(
        &self,
        bars: &[Bar],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CoreResult<BacktestOutput> {
        let lo = bars.partition_point(|b| start.is_some_and(|s| b.date < s));
        let hi = bars.partition_point(|b| !end.is_some_and(|e| b.date > e));
        if lo >= hi {
            return Err(CoreError::InvalidInput(
                "no bars in the requested date range".to_string(),
            ));
        }
        self.run(&bars[lo..hi])
    }

    /// Run with a host-owned cancellation flag, checked between bars.
    /// State is consistent at every bar boundary, so a cancelled run's
    /// output can be discarded safely.
    pub fn run_cancellable(
        &self,
        bars: &[Bar],
        cancel: &AtomicBool,
    ) -> CoreResult<BacktestOutput> {
        if bars.is_empty() {
            return Err(CoreError::InvalidInput("empty bar series".to_string()));
        }

        let mut state = PortfolioState::new(self.config.initial_capital);
        let mut equity_curve: Vec<EquityPoint> = Vec::with_capacity(bars.len());
        let mut trades: Vec<TradeRecord> = Vec::new();
        let mut halt = None;

        info!(
            "backtest: {} bars, {} to {}",
            bars.len(),
            bars[0].date,
            bars[bars.len() - 1].date
        );

        for (i, bar) in bars.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                halt = Some(HaltReason::Cancelled);
                break;
            }
            let price = bar.close;

            // Warm-up: hold whatever we have (nothing) at mark-to-market.
            if i + 1 < WARMUP_BARS {
                push_equity_point(&mut equity_curve, &mut state, bar.date, price);
                continue;
            }

            // Everything below sees only bars[..=i].
            let available = &bars[..=i];
            let features = compute_features(available);

            let mut signal_results: Vec<SignalResult> = Vec::with_capacity(self.signals.len());
            for signal in &self.signals {
                match signal.compute(available, &features, bar.date) {
                    Ok(result) => signal_results.push(result),
                    Err(e) => {
                        warn!("signal {} failed on {}: {e}", signal.name(), bar.date);
                    }
                }
            }
            if signal_results.is_empty() {
                push_equity_point(&mut equity_curve, &mut state, bar.date, price);
                continue;
            }

            let forecast = self.ensemble.combine(&signal_results);

            let equity_now = state.equity(price);
            if equity_now <= 0.0 {
                warn!("equity exhausted on {}, stopping", bar.date);
                break;
            }

            // Trailing vol estimate; sizing takes daily units.
            let annual_vol = trailing_annual_vol(available).unwrap_or(DEFAULT_ANNUAL_VOL);
            let daily_vol = annual_vol / TRADING_DAYS.sqrt();

            let size_pct = compute_position_size(
                forecast.direction,
                forecast.confidence,
                daily_vol,
                self.config.target_vol_daily,
                self.config.max_position_size,
                self.config.vol_floor,
            );
            let size_pct = self.constraints.apply_leverage(size_pct);

            let desired_shares = if forecast.direction == Direction::Flat || price <= 0.0 {
                0.0
            } else {
                forecast.direction.sign() * equity_now * size_pct / price
            };

            let should_trade = self.constraints.should_trade(
                forecast.direction,
                state.prev_direction,
                forecast.confidence,
                state.prev_confidence,
            );

            let delta = desired_shares - state.position_shares;
            if should_trade && delta.abs() > POSITION_EPS {
                let notional = delta.abs() * price;
                let cost =
                    self.cost_model
                        .compute_cost(notional, price, bar.volume, annual_vol);
                let realized_pnl = state.rebalance(desired_shares, price, cost);
                let action = if delta > 0.0 { TradeAction::Buy } else { TradeAction::Sell };
                debug!(
                    "{}: {:?} {:.2} @ {:.2} pnl {:.2} cost {:.2} -> pos {:.2}",
                    bar.date, action, delta.abs(), price, realized_pnl, cost,
                    state.position_shares
                );
                trades.push(TradeRecord {
                    date: bar.date,
                    action,
                    quantity: delta.abs(),
                    price,
                    realized_pnl,
                    position_after: state.position_shares,
                });
            }

            state.prev_direction = forecast.direction;
            state.prev_confidence = forecast.confidence;

            let prev_equity = equity_curve.last().map(|p| p.equity);
            push_equity_point(&mut equity_curve, &mut state, bar.date, price);
            let marked_equity = equity_curve.last().map_or(equity_now, |p| p.equity);

            // Drawdown stop: evaluated after the bar is recorded, so the
            // triggering bar's equity point is part of the curve and no
            // trading happens after it.
            if self
                .constraints
                .drawdown_stop_triggered(marked_equity, state.peak_equity)
            {
                halt = Some(HaltReason::DrawdownStop);
                break;
            }

            // Daily-loss stop: one-day equity return vs the previous point.
            if let Some(prev) = prev_equity {
                if prev > 0.0
                    && self
                        .constraints
                        .daily_loss_stop_triggered(marked_equity / prev - 1.0)
                {
                    halt = Some(HaltReason::DailyLossStop);
                    break;
                }
            }
        }

        let metrics = compute_metrics(&equity_curve, &trades);
        info!(
            "backtest complete: cagr={:.2}% sharpe={:.2} max_dd={:.2}% trades={}{}",
            metrics.cagr * 100.0,
            metrics.sharpe,
            metrics.max_drawdown * 100.0,
            metrics.total_trades,
            halt.map(|h| format!(" halt={h:?}")).unwrap_or_default()
        );

        Ok(BacktestOutput { equity_curve, trades, metrics, halt })
    }

    /// Forecast at the last bar of a series, with the per-signal detail.
    /// Needs a full warm-up of history.
    pub fn forecast_latest(
        &self,
        bars: &[Bar],
    ) -> CoreResult<(Forecast, Vec<SignalResult>)> {
        if bars.is_empty() {
            return Err(CoreError::InvalidInput("empty bar series".to_string()));
        }
        if bars.len() < WARMUP_BARS {
            return Err(CoreError::InsufficientData {
                have: bars.len(),
                need: WARMUP_BARS,
            });
        }
        let t = bars[bars.len() - 1].date;
        let features = compute_features(bars);
        let mut results = Vec::with_capacity(self.signals.len());
        for signal in &self.signals {
            match signal.compute(bars, &features, t) {
                Ok(result) => results.push(result),
                Err(e) => warn!("signal {} failed on {t}: {e}", signal.name()),
            }
        }
        let forecast = self.ensemble.combine(&results);
        Ok((forecast, results))
    }
}

/// Append the mark-to-market point for a bar, updating the peak first so a
/// fresh high shows a drawdown of zero.
fn push_equity_point(
    curve: &mut Vec<EquityPoint>,
    state: &mut PortfolioState,
    date: NaiveDate,
    price: f64,
) {
    let equity = state.equity(price);
    if equity > state.peak_equity {
        state.peak_equity = equity;
    }
    let drawdown = if state.peak_equity > 0.0 {
        (equity - state.peak_equity) / state.peak_equity
    } else {
        0.0
    };
    curve.push(EquityPoint { date, equity, drawdown });
}

/// Annualized sample std of the last 20 daily close returns, or None when
/// undefined or non-positive.
fn trailing_annual_vol(bars: &[Bar]) -> Option<f64> {
    const WINDOW: usize = 20;
    if bars.len() < WINDOW + 1 {
        return None;
    }
    let tail = &bars[bars.len() - (WINDOW + 1)..];
    let mut returns = Vec::with_capacity(WINDOW);
    for pair in tail.windows(2) {
        let prev = pair[0].close;
        if prev <= 0.0 {
            return None;
        }
        returns.push(pair[1].close / prev - 1.0);
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
        / (returns.len() - 1) as f64;
    let vol = var.sqrt() * TRADING_DAYS.sqrt();
    (vol.is_finite() && vol > 0.0).then_some(vol)
}
