// Criterion benchmark for the backtest loop. The engine recomputes the
// feature frame from the bar prefix on every step, so run time is
// quadratic in bar count — worth watching as the feature set grows.

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tidemark::backtesting::BacktestEngine;
use tidemark::config::CoreConfig;
use tidemark::market_data::Bar;

fn synthetic_bars(days: usize) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let mut price = 100.0f64;
    (0..days)
        .map(|i| {
            let shock = if i % 2 == 0 { 0.012 } else { -0.010 };
            price *= 1.0 + shock;
            Bar {
                date: start + Days::new(i as u64),
                open: price * 0.999,
                high: price * 1.01,
                low: price * 0.99,
                close: price,
                volume: 1_500_000.0,
            }
        })
        .collect()
}

fn bench_backtest(c: &mut Criterion) {
    let engine = BacktestEngine::new(CoreConfig::default()).unwrap();
    let mut group = c.benchmark_group("backtest_run");
    for days in [120usize, 250, 500] {
        let bars = synthetic_bars(days);
        group.bench_with_input(BenchmarkId::from_parameter(days), &bars, |b, bars| {
            b.iter(|| engine.run(black_box(bars)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_backtest);
criterion_main!(benches);
