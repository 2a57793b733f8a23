// Signal contract checks across real feature frames: ranges, neutrality
// on missing data, and directional sanity on constructed paths.

mod helpers;

use helpers::{bars_from_closes, start_date, synthetic_bars};
use tidemark::features::compute_features;
use tidemark::signals::{builtin_signals, MeanReversionSignal, MomentumSignal, Signal};

#[test]
fn all_signals_respect_their_ranges_everywhere() {
    let paths = [
        synthetic_bars(100.0, 120, 0.10, 0.15),
        synthetic_bars(50.0, 120, -0.20, 0.45),
        synthetic_bars(500.0, 120, 0.0, 0.02),
        bars_from_closes(&vec![75.0; 120]),
    ];
    for bars in &paths {
        let frame = compute_features(bars);
        for signal in builtin_signals() {
            for bar in bars {
                let r = signal.compute(bars, &frame, bar.date).unwrap();
                assert!(
                    (-1.0..=1.0).contains(&r.score),
                    "{} score {} out of range",
                    r.name,
                    r.score
                );
                assert!(
                    (0.0..=1.0).contains(&r.confidence),
                    "{} confidence {} out of range",
                    r.name,
                    r.confidence
                );
                if r.name == "regime" {
                    assert!(r.score >= 0.0, "regime gate must not be directional");
                }
            }
        }
    }
}

#[test]
fn signals_are_neutral_before_history_exists() {
    let bars = synthetic_bars(100.0, 120, 0.05, 0.2);
    let frame = compute_features(&bars);
    let before_everything = start_date() - chrono::Days::new(30);
    for signal in builtin_signals() {
        let r = signal.compute(&bars, &frame, before_everything).unwrap();
        assert_eq!(r.score, 0.0, "{} not neutral", r.name);
        assert_eq!(r.confidence, 0.0);
        assert!(r.explanation.reason.contains("insufficient"));
    }
}

#[test]
fn momentum_tracks_trend_direction() {
    let up: Vec<f64> = (0..100).map(|i| 100.0 * 1.004f64.powi(i)).collect();
    let bars = bars_from_closes(&up);
    let frame = compute_features(&bars);
    let t = bars.last().unwrap().date;
    let r = MomentumSignal::new().compute(&bars, &frame, t).unwrap();
    assert!(r.score > 0.3, "uptrend score {}", r.score);

    let down: Vec<f64> = (0..100).map(|i| 100.0 * 0.996f64.powi(i)).collect();
    let bars = bars_from_closes(&down);
    let frame = compute_features(&bars);
    let t = bars.last().unwrap().date;
    let r = MomentumSignal::new().compute(&bars, &frame, t).unwrap();
    assert!(r.score < -0.3, "downtrend score {}", r.score);
}

#[test]
fn pullback_leans_against_a_spike() {
    // Stable around 100, then a sharp spike up: overbought, expect a
    // negative (sell) score with real confidence.
    let mut closes: Vec<f64> = synthetic_bars(100.0, 80, 0.0, 0.12)
        .iter()
        .map(|b| b.close)
        .collect();
    let last = *closes.last().unwrap();
    closes.push(last * 1.08);
    let bars = bars_from_closes(&closes);
    let frame = compute_features(&bars);
    let t = bars.last().unwrap().date;
    let r = MeanReversionSignal::new().compute(&bars, &frame, t).unwrap();
    assert!(r.score < 0.0, "spike score {}", r.score);
    assert!(r.confidence > 0.3, "spike confidence {}", r.confidence);
}

#[test]
fn signal_timestamps_are_midnight_utc_of_the_bar() {
    let bars = synthetic_bars(100.0, 70, 0.05, 0.2);
    let frame = compute_features(&bars);
    let t = bars.last().unwrap().date;
    for signal in builtin_signals() {
        let r = signal.compute(&bars, &frame, t).unwrap();
        assert_eq!(r.timestamp.date_naive(), t);
        assert_eq!(r.timestamp.format("%H:%M:%S").to_string(), "00:00:00");
    }
}
