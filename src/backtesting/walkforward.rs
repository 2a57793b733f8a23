// Walk-forward evaluation: rolling train/test windows over one bar series.
//
// Each test window gets a fresh engine run restricted to that window, so
// no window ever sees another window's data. Per-window metrics are kept
// alongside a combined equity curve (deduplicated by date, last window
// wins) and a combined trade log.

use chrono::{Days, NaiveDate};
use log::{info, warn};
use serde::Serialize;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::market_data::Bar;

use super::engine::BacktestEngine;
use super::metrics::{BacktestMetrics, EquityPoint};
use super::trade::TradeRecord;

/// One train/test window. Training dates are reported for context even
/// though the current ensemble carries no fitted parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    pub test_start: NaiveDate,
    pub test_end: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalkForwardReport {
    pub windows: Vec<Window>,
    pub window_metrics: Vec<BacktestMetrics>,
    pub combined_equity: Vec<EquityPoint>,
    pub combined_trades: Vec<TradeRecord>,
}

#[derive(Debug, Clone)]
pub struct WalkForwardEvaluator {
    pub train_years: u64,
    pub test_months: u64,
    pub step_months: u64,
}

impl Default for WalkForwardEvaluator {
    fn default() -> Self {
        Self { train_years: 1, test_months: 3, step_months: 1 }
    }
}

impl WalkForwardEvaluator {
    pub fn new(train_years: u64, test_months: u64, step_months: u64) -> Self {
        Self { train_years, test_months, step_months }
    }

    /// Run the evaluation between `start` and `end`.
    pub fn evaluate(
        &self,
        config: &CoreConfig,
        bars: &[Bar],
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<WalkForwardReport> {
        if start >= end {
            return Err(CoreError::InvalidInput(format!(
                "walk-forward range is empty: {start} >= {end}"
            )));
        }
        if self.step_months == 0 {
            return Err(CoreError::InvalidInput(
                "step_months must be at least 1".to_string(),
            ));
        }

        let windows = self.generate_windows(start, end);
        info!("walk-forward: {} windows from {start} to {end}", windows.len());

        let engine = BacktestEngine::new(config.clone())?;
        let mut kept_windows = Vec::new();
        let mut window_metrics = Vec::new();
        let mut combined_equity: Vec<EquityPoint> = Vec::new();
        let mut combined_trades: Vec<TradeRecord> = Vec::new();

        for window in windows {
            let output = match engine.run_range(
                bars,
                Some(window.test_start),
                Some(window.test_end),
            ) {
                Ok(output) => output,
                Err(CoreError::InvalidInput(msg)) => {
                    warn!(
                        "skipping window {} to {}: {msg}",
                        window.test_start, window.test_end
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            // Last window wins on overlapping dates.
            for point in output.equity_curve {
                match combined_equity
                    .iter_mut()
                    .find(|existing| existing.date == point.date)
                {
                    Some(existing) => *existing = point,
                    None => combined_equity.push(point),
                }
            }
            combined_trades.extend(output.trades);
            window_metrics.push(output.metrics);
            kept_windows.push(window);
        }

        combined_equity.sort_by_key(|p| p.date);
        combined_trades.sort_by_key(|t| t.date);

        Ok(WalkForwardReport {
            windows: kept_windows,
            window_metrics,
            combined_equity,
            combined_trades,
        })
    }

    /// Generate train/test windows stepping forward by `step_months`.
    /// Month arithmetic uses 30-day months and 365-day years, which keeps
    /// window boundaries independent of calendar quirks.
    fn generate_windows(&self, start: NaiveDate, end: NaiveDate) -> Vec<Window> {
        let mut windows = Vec::new();
        let mut current = start;
        while current < end {
            let train_start = current - Days::new(self.train_years * 365);
            let train_end = current - Days::new(1);
            let test_start = current;
            let test_end = (current + Days::new(self.test_months * 30)).min(end);
            windows.push(Window { train_start, train_end, test_start, test_end });
            current = current + Days::new(self.step_months * 30);
        }
        windows
    }
}
