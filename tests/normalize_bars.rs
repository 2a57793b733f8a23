// Bar normalizer scenarios: repair, dedup, warning emission, idempotence.

use chrono::{Datelike, NaiveDate};
use tidemark::market_data::{normalize_bars, NormalizeWarning, RawBar};

fn raw(day: u32, o: f64, h: f64, l: f64, c: f64, v: f64) -> RawBar {
    RawBar {
        date: NaiveDate::from_ymd_opt(2024, 1, day),
        open: Some(o),
        high: Some(h),
        low: Some(l),
        close: Some(c),
        volume: Some(v),
    }
}

#[test]
fn repair_scenario_dedup_clamp_and_warn() {
    // Two rows share date 1 (last kept); the survivor is clean, but the
    // first carries both an OHLC violation and negative volume, which the
    // dedup discards before repair.
    let (bars, warnings) = normalize_bars(vec![
        raw(1, 10.0, 9.0, 8.0, 10.0, -5.0),
        raw(1, 10.0, 11.0, 9.0, 10.0, 100.0),
        raw(2, 10.0, 15.0, 9.0, 14.0, 100.0),
    ]);

    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].high, 11.0);
    assert_eq!(bars[0].volume, 100.0);
    assert_eq!(bars[1].close, 14.0);
    assert!(warnings
        .iter()
        .any(|w| matches!(w, NormalizeWarning::DuplicateDateRemoved { count: 1 })));

    // Same rows without the duplicate: now the broken row must be repaired
    // in place and its volume clamped.
    let (bars, warnings) = normalize_bars(vec![
        raw(1, 10.0, 9.0, 8.0, 10.0, -5.0),
        raw(2, 10.0, 15.0, 9.0, 14.0, 100.0),
    ]);
    assert_eq!(bars[0].high, 10.0); // clamped up to max(open, close, low)
    assert_eq!(bars[0].volume, 0.0);
    assert!(warnings
        .iter()
        .any(|w| matches!(w, NormalizeWarning::OhlcRepaired { count } if *count >= 1)));
    assert!(warnings
        .iter()
        .any(|w| matches!(w, NormalizeWarning::NegativeVolumeZeroed { count: 1 })));
}

#[test]
fn out_of_order_input_is_sorted() {
    let (bars, _) = normalize_bars(vec![
        raw(5, 10.0, 11.0, 9.0, 10.0, 1.0),
        raw(2, 10.0, 11.0, 9.0, 10.0, 1.0),
        raw(9, 10.0, 11.0, 9.0, 10.0, 1.0),
    ]);
    let dates: Vec<_> = bars.iter().map(|b| b.date.day()).collect();
    assert_eq!(dates, vec![2, 5, 9]);
}

#[test]
fn missing_fields_drop_the_row() {
    let mut incomplete = raw(3, 10.0, 11.0, 9.0, 10.0, 1.0);
    incomplete.close = None;
    let mut non_finite = raw(4, 10.0, 11.0, 9.0, 10.0, 1.0);
    non_finite.open = Some(f64::NAN);
    let (bars, warnings) = normalize_bars(vec![
        incomplete,
        non_finite,
        raw(5, 10.0, 11.0, 9.0, 10.0, 1.0),
    ]);
    assert_eq!(bars.len(), 1);
    assert!(warnings
        .iter()
        .any(|w| matches!(w, NormalizeWarning::RowsDropped { count: 2 })));
}

#[test]
fn split_suspects_are_flagged_not_repriced() {
    let (bars, warnings) = normalize_bars(vec![
        raw(1, 100.0, 101.0, 99.0, 100.0, 1.0),
        raw(2, 100.0, 101.0, 99.0, 160.0, 1.0), // +60%
        raw(3, 160.0, 161.0, 159.0, 160.0, 1.0),
    ]);
    assert_eq!(bars[1].close, 160.0);
    let jump = warnings
        .iter()
        .find_map(|w| match w {
            NormalizeWarning::LargePriceJump { dates, pcts } => Some((dates, pcts)),
            _ => None,
        })
        .expect("expected a large_price_jump warning");
    assert_eq!(jump.0.len(), 1);
    assert!((jump.1[0] - 60.0).abs() < 1e-9);
}

#[test]
fn unusual_price_levels_are_flagged() {
    let (_, warnings) = normalize_bars(vec![raw(1, 0.4, 0.5, 0.3, 0.4, 1.0)]);
    assert!(warnings
        .iter()
        .any(|w| matches!(w, NormalizeWarning::UnusualPriceRange { .. })));
}

#[test]
fn normalizing_twice_is_the_identity() {
    let (bars, _) = normalize_bars(vec![
        raw(1, 10.0, 9.0, 11.0, 10.0, -5.0),
        raw(1, 10.0, 12.0, 9.0, 11.0, 50.0),
        raw(2, 11.0, 12.0, 10.0, 11.5, 60.0),
        raw(3, 11.5, 12.5, 11.0, 12.0, 70.0),
    ]);
    let again: Vec<RawBar> = bars
        .iter()
        .map(|b| RawBar {
            date: Some(b.date),
            open: Some(b.open),
            high: Some(b.high),
            low: Some(b.low),
            close: Some(b.close),
            volume: Some(b.volume),
        })
        .collect();
    let (bars2, warnings2) = normalize_bars(again);
    assert_eq!(bars, bars2);
    assert!(!warnings2.iter().any(|w| matches!(
        w,
        NormalizeWarning::RowsDropped { .. }
            | NormalizeWarning::DuplicateDateRemoved { .. }
            | NormalizeWarning::OhlcRepaired { .. }
            | NormalizeWarning::NegativeVolumeZeroed { .. }
    )));
}
