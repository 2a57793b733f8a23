// Canonical OHLCV bars and the normalizer that produces them.
//
// The normalizer is the only place raw producer records are coerced into
// the invariants the rest of the pipeline assumes: finite values, repaired
// OHLC ranges, non-negative volume, strictly increasing dates. Repairs are
// warnings, never errors; a bar is dropped only when no repair is possible
// (missing field, no parseable date).

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// One trading day of open/high/low/close/volume for a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A raw OHLCV-like record from any producer, before normalization.
/// Fields a producer could not parse are None.
#[derive(Debug, Clone, Default)]
pub struct RawBar {
    pub date: Option<NaiveDate>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Data-quality warnings emitted by [`normalize_bars`]. Non-fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizeWarning {
    /// Rows missing a required field or a parseable date were dropped.
    RowsDropped { count: usize },
    /// Duplicate dates collapsed, last write wins.
    DuplicateDateRemoved { count: usize },
    /// `high`/`low` clamped to contain open/close.
    OhlcRepaired { count: usize },
    /// Negative volume clamped to zero.
    NegativeVolumeZeroed { count: usize },
    /// Day-over-day |close return| > 35% — suspected split/adjustment.
    /// Prices are left untouched.
    LargePriceJump {
        dates: Vec<NaiveDate>,
        pcts: Vec<f64>,
    },
    /// Last close outside the $1–$10000 range typical for equities —
    /// may indicate a symbol mismatch or bad scaling.
    UnusualPriceRange { last_close: f64 },
}

/// Absolute day-over-day close return above which a split/adjustment is
/// suspected.
const LARGE_JUMP_THRESHOLD: f64 = 0.35;

/// Coerce raw records into a canonical bar series.
///
/// On return the bars are sorted ascending by date with no duplicates,
/// all values are finite, `high >= max(open, close, low)`,
/// `low <= min(open, close, high)` and `volume >= 0`.
pub fn normalize_bars(raw: Vec<RawBar>) -> (Vec<Bar>, Vec<NormalizeWarning>) {
    let mut warnings = Vec::new();

    // Drop rows that cannot be repaired: no date, or any missing /
    // non-finite value.
    let input_len = raw.len();
    let mut bars: Vec<Bar> = raw
        .into_iter()
        .filter_map(|r| {
            let date = r.date?;
            let open = r.open.filter(|v| v.is_finite())?;
            let high = r.high.filter(|v| v.is_finite())?;
            let low = r.low.filter(|v| v.is_finite())?;
            let close = r.close.filter(|v| v.is_finite())?;
            let volume = r.volume.filter(|v| v.is_finite())?;
            Some(Bar { date, open, high, low, close, volume })
        })
        .collect();
    let dropped = input_len - bars.len();
    if dropped > 0 {
        warn!("normalize: dropped {dropped} unparseable rows");
        warnings.push(NormalizeWarning::RowsDropped { count: dropped });
    }

    // Sort ascending; stable sort keeps producer order within a date so
    // "last write wins" below is well-defined.
    bars.sort_by_key(|b| b.date);

    // Deduplicate by date, keeping the last record for each date.
    let before_dedup = bars.len();
    let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => deduped.push(bar),
        }
    }
    let mut bars = deduped;
    let duplicates = before_dedup - bars.len();
    if duplicates > 0 {
        warn!("normalize: removed {duplicates} duplicate dates (kept last)");
        warnings.push(NormalizeWarning::DuplicateDateRemoved { count: duplicates });
    }

    // Repair OHLC range violations by clamping high/low.
    let mut repaired = 0usize;
    for bar in bars.iter_mut() {
        let hi_floor = bar.open.max(bar.close).max(bar.low);
        let lo_ceil = bar.open.min(bar.close).min(bar.high);
        let mut touched = false;
        if bar.high < hi_floor {
            bar.high = hi_floor;
            touched = true;
        }
        if bar.low > lo_ceil {
            bar.low = lo_ceil;
            touched = true;
        }
        if touched {
            repaired += 1;
        }
    }
    if repaired > 0 {
        warn!("normalize: repaired {repaired} rows with inconsistent OHLC");
        warnings.push(NormalizeWarning::OhlcRepaired { count: repaired });
    }

    // Clamp negative volume to zero.
    let mut negative_volume = 0usize;
    for bar in bars.iter_mut() {
        if bar.volume < 0.0 {
            bar.volume = 0.0;
            negative_volume += 1;
        }
    }
    if negative_volume > 0 {
        warn!("normalize: zeroed {negative_volume} rows with negative volume");
        warnings.push(NormalizeWarning::NegativeVolumeZeroed { count: negative_volume });
    }

    // Suspected splits/adjustments: flag, never re-price.
    let mut jump_dates = Vec::new();
    let mut jump_pcts = Vec::new();
    for pair in bars.windows(2) {
        let prev = pair[0].close;
        if prev.abs() < f64::EPSILON {
            continue;
        }
        let pct = (pair[1].close - prev) / prev;
        if pct.abs() > LARGE_JUMP_THRESHOLD {
            jump_dates.push(pair[1].date);
            jump_pcts.push(pct * 100.0);
        }
    }
    if !jump_dates.is_empty() {
        warn!(
            "normalize: {} large price jumps (>35% day-over-day), first at {}",
            jump_dates.len(),
            jump_dates[0]
        );
        warnings.push(NormalizeWarning::LargePriceJump { dates: jump_dates, pcts: jump_pcts });
    }

    // Sanity-check the price level of the series.
    if let Some(last) = bars.last() {
        if last.close < 1.0 || last.close > 10_000.0 {
            warn!(
                "normalize: unusual close price ${:.2} (expected $1-$10000)",
                last.close
            );
            warnings.push(NormalizeWarning::UnusualPriceRange { last_close: last.close });
        }
    }

    debug!("normalize: {} bars out, {} warnings", bars.len(), warnings.len());
    (bars, warnings)
}
