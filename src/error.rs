// Error taxonomy at the core boundary.
//
// Inside the core every fallible function returns Result<_, CoreError>;
// only the outermost caller (CLI, or a future HTTP adapter) translates
// these into user-facing responses. Designed halts (drawdown stop,
// daily-loss stop) are NOT errors — they are labeled outcomes on
// BacktestOutput.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Bad parameters or bad request shape: empty bar series, non-positive
    /// capital, unparseable date range, non-finite config values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Not enough history to compute features and signals.
    #[error("insufficient data: have {have} bars, need {need}")]
    InsufficientData { have: usize, need: usize },

    /// A signal failed to compute. Bar-local signal failures are caught and
    /// logged by the engine; this surfaces only when a caller asks a single
    /// signal directly.
    #[error("signal error: {0}")]
    Signal(String),

    /// Invariant violation inside the engine. Should never occur on
    /// normalized input; reported so tests can detect regressions.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
