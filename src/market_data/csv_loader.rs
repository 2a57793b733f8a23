// Generic CSV loader for Yahoo Finance format (Date,Open,High,Low,Close,Volume,...)
// Boundary adapter: parses leniently, then funnels everything through the
// normalizer so the core only ever sees canonical bars.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::ReaderBuilder;
use log::debug;

use crate::error::{CoreError, CoreResult};

use super::bars::{normalize_bars, Bar, NormalizeWarning, RawBar};
use super::source::BarSource;

/// CSV-backed [`BarSource`]. One file, one ticker.
#[derive(Debug, Clone)]
pub struct CsvBarSource {
    path: PathBuf,
}

impl CsvBarSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    // Yahoo exports either plain dates or "2025-01-03 00:00:00-05:00";
    // keep just the date part.
    let date_part = s.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn parse_field(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s == "null" || s == "N/A" {
        return None;
    }
    s.parse().ok()
}

/// Load raw OHLCV rows from a Yahoo-style CSV. Bad rows become RawBars with
/// missing fields; the normalizer decides what to drop.
pub fn load_csv_bars(path: &Path) -> CoreResult<Vec<RawBar>> {
    let file = File::open(path)
        .map_err(|e| CoreError::InvalidInput(format!("cannot open {}: {e}", path.display())))?;
    let mut rdr = ReaderBuilder::new()
        .flexible(true)      // Handles varying column counts
        .trim(csv::Trim::All)
        .has_headers(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record =
            result.map_err(|e| CoreError::InvalidInput(format!("bad CSV record: {e}")))?;
        if record.len() < 6 {
            continue; // Skip short rows
        }
        rows.push(RawBar {
            date: parse_date(&record[0]),
            open: parse_field(&record[1]),
            high: parse_field(&record[2]),
            low: parse_field(&record[3]),
            close: parse_field(&record[4]),
            volume: parse_field(&record[5]),
        });
    }
    debug!("loaded {} raw rows from {}", rows.len(), path.display());
    Ok(rows)
}

impl BarSource for CsvBarSource {
    fn get_bars(
        &self,
        _ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CoreResult<(Vec<Bar>, Vec<NormalizeWarning>)> {
        let raw = load_csv_bars(&self.path)?;
        let (mut bars, warnings) = normalize_bars(raw);
        if let Some(start) = start {
            bars.retain(|b| b.date >= start);
        }
        if let Some(end) = end {
            bars.retain(|b| b.date <= end);
        }
        if bars.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "no valid bars in {} for the requested range",
                self.path.display()
            )));
        }
        Ok((bars, warnings))
    }
}
