// BarSource: the seam between the core and whatever supplies history.

use chrono::NaiveDate;

use crate::error::CoreResult;

use super::bars::{Bar, NormalizeWarning};

/// Supplies ordered, normalized daily bars for a ticker over a date range.
///
/// Implementations must return bars that satisfy the normalizer invariants
/// (ascending unique dates, finite values, consistent OHLC); the simplest
/// way to guarantee that is to run raw records through
/// [`normalize_bars`](super::normalize_bars) before returning.
pub trait BarSource {
    fn get_bars(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CoreResult<(Vec<Bar>, Vec<NormalizeWarning>)>;
}
