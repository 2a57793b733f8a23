// Text reports for the CLI, in the house banner-and-table style.

use tidemark::backtesting::{BacktestOutput, WalkForwardReport};
use tidemark::config::CoreConfig;
use tidemark::market_data::Bar;
use tidemark::models::Forecast;
use tidemark::signals::SignalResult;

pub fn print_forecast(
    ticker: &str,
    bars: &[Bar],
    forecast: &Forecast,
    signals: &[SignalResult],
) {
    let last = bars.last().expect("caller guarantees bars");
    println!("{}", "=".repeat(70));
    println!("FORECAST - {} @ {} (close {:.2})", ticker, last.date, last.close);
    println!("{}", "=".repeat(70));
    println!("Direction:   {}", forecast.direction);
    println!("Confidence:  {:.2}", forecast.confidence);
    println!("Size hint:   {:.2}", forecast.size_hint);
    println!("Regime:      {}", forecast.explanation.regime_note);
    println!();
    println!("Signals");
    println!("{}", "-".repeat(70));
    for s in signals {
        println!(
            "{:<16} score {:>6.2}  confidence {:>5.2}  {}",
            s.name, s.score, s.confidence, s.explanation.reason
        );
    }
    if !forecast.explanation.top_contributors.is_empty() {
        println!();
        println!("Top contributors");
        println!("{}", "-".repeat(70));
        for c in &forecast.explanation.top_contributors {
            println!("{:<16} {:+.4}", c.signal, c.contribution);
        }
    }
    println!("{}", "=".repeat(70));
}

pub fn print_backtest(ticker: &str, config: &CoreConfig, output: &BacktestOutput) {
    let m = &output.metrics;
    let final_equity = output
        .equity_curve
        .last()
        .map(|p| p.equity)
        .unwrap_or(config.initial_capital);
    println!("{}", "=".repeat(70));
    println!("BACKTEST RESULTS - {ticker}");
    println!("{}", "=".repeat(70));
    if let (Some(first), Some(last)) = (output.equity_curve.first(), output.equity_curve.last())
    {
        println!("Period: {} to {}", first.date, last.date);
    }
    println!("Initial Capital: ${:.2}", config.initial_capital);
    println!("Final Equity:    ${:.2}", final_equity);
    if let Some(halt) = output.halt {
        println!("Halted:          {halt:?}");
    }
    println!();
    println!("PERFORMANCE METRICS");
    println!("{}", "-".repeat(70));
    println!("CAGR:             {:>10.2}%", m.cagr * 100.0);
    println!("Sharpe Ratio:     {:>10.2}", m.sharpe);
    println!("Max Drawdown:     {:>10.2}%", m.max_drawdown * 100.0);
    println!("Win Rate:         {:>10.2}%", m.win_rate * 100.0);
    match m.profit_factor {
        Some(pf) => println!("Profit Factor:    {:>10.2}", pf),
        None => println!("Profit Factor:    {:>10}", "n/a"),
    }
    println!("Turnover:         {:>10.3}", m.turnover);
    println!("Exposure:         {:>10.3}", m.exposure);
    println!("Total Trades:     {:>10}", m.total_trades);
    println!("{}", "=".repeat(70));
}

pub fn print_walkforward(ticker: &str, report: &WalkForwardReport) {
    println!("{}", "=".repeat(70));
    println!("WALK-FORWARD EVALUATION - {ticker}");
    println!("{}", "=".repeat(70));
    println!(
        "{:<12} {:<12} {:>8} {:>8} {:>9} {:>7}",
        "Test start", "Test end", "CAGR%", "Sharpe", "MaxDD%", "Trades"
    );
    println!("{}", "-".repeat(70));
    for (w, m) in report.windows.iter().zip(&report.window_metrics) {
        println!(
            "{:<12} {:<12} {:>8.2} {:>8.2} {:>9.2} {:>7}",
            w.test_start.to_string(),
            w.test_end.to_string(),
            m.cagr * 100.0,
            m.sharpe,
            m.max_drawdown * 100.0,
            m.total_trades
        );
    }
    println!("{}", "-".repeat(70));
    println!(
        "Combined: {} equity points, {} trades",
        report.combined_equity.len(),
        report.combined_trades.len()
    );
    println!("{}", "=".repeat(70));
}
