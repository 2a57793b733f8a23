// Backtesting framework: leakage-safe historical simulation of the
// signal → ensemble → sizing pipeline, with full P&L accounting and
// performance metrics.

pub mod costs;
pub mod engine;
pub mod metrics;
pub mod state;
pub mod trade;
pub mod walkforward;

pub use costs::TransactionCostModel;
pub use engine::{BacktestEngine, BacktestOutput, HaltReason, WARMUP_BARS};
pub use metrics::{compute_metrics, BacktestMetrics, EquityPoint};
pub use state::PortfolioState;
pub use trade::{TradeAction, TradeRecord};
pub use walkforward::{WalkForwardEvaluator, WalkForwardReport};
