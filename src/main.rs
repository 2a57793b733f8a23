// CLI entry point: forecast, backtest and walk-forward over a CSV of
// daily bars. The library does the work; this binary only parses
// arguments, wires the CSV bar source in, and prints reports.

mod report;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::warn;

use tidemark::backtesting::{BacktestEngine, WalkForwardEvaluator};
use tidemark::config::{preset, preset_names, CoreConfig};
use tidemark::error::CoreError;
use tidemark::market_data::{BarSource, CsvBarSource};

#[derive(Parser)]
#[command(name = "tidemark", about = "Signal-ensemble research backtester for daily equity bars")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Path to a Yahoo-style OHLCV CSV file
    #[arg(long)]
    csv: String,
    /// Ticker label used in reports
    #[arg(long, default_value = "TICKER")]
    ticker: String,
    /// Strategy preset: default, trend, mean_reversion, conservative
    #[arg(long)]
    preset: Option<String>,
    /// Emit JSON instead of a text report
    #[arg(long)]
    json: bool,
    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the latest-bar forecast with per-signal detail
    Forecast {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Run a full backtest and print performance metrics
    Backtest {
        #[command(flatten)]
        common: CommonArgs,
        /// Starting capital in dollars
        #[arg(long)]
        capital: Option<f64>,
        /// Drawdown stop as a negative fraction, e.g. -0.2
        #[arg(long)]
        max_drawdown: Option<f64>,
        /// Daily-loss stop as a negative fraction, e.g. -0.05
        #[arg(long)]
        max_daily_loss: Option<f64>,
    },
    /// Rolling train/test evaluation
    Walkforward {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, default_value_t = 1)]
        train_years: u64,
        #[arg(long, default_value_t = 3)]
        test_months: u64,
        #[arg(long, default_value_t = 1)]
        step_months: u64,
    },
}

fn load_config(common: &CommonArgs) -> CoreConfig {
    let (config, warnings) = preset(common.preset.as_deref());
    for w in warnings {
        warn!("{w} (known presets: {})", preset_names().join(", "));
    }
    config
}

fn load_bars(
    common: &CommonArgs,
) -> Result<Vec<tidemark::market_data::Bar>, CoreError> {
    let source = CsvBarSource::new(&common.csv);
    let (bars, warnings) = source.get_bars(&common.ticker, common.start, common.end)?;
    for w in &warnings {
        warn!("data quality: {w:?}");
    }
    Ok(bars)
}

fn run() -> Result<(), CoreError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Forecast { common } => {
            let config = load_config(&common);
            let bars = load_bars(&common)?;
            let engine = BacktestEngine::new(config)?;
            let (forecast, signals) = engine.forecast_latest(&bars)?;
            if common.json {
                let payload = serde_json::json!({
                    "ticker": common.ticker,
                    "date": bars.last().map(|b| b.date),
                    "forecast": forecast,
                    "signals": signals,
                });
                println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
            } else {
                report::print_forecast(&common.ticker, &bars, &forecast, &signals);
            }
        }
        Command::Backtest { common, capital, max_drawdown, max_daily_loss } => {
            let mut config = load_config(&common);
            if let Some(capital) = capital {
                config.initial_capital = capital;
            }
            if max_drawdown.is_some() {
                config.max_drawdown = max_drawdown;
            }
            if max_daily_loss.is_some() {
                config.max_daily_loss = max_daily_loss;
            }
            let bars = load_bars(&common)?;
            let engine = BacktestEngine::new(config.clone())?;
            let output = engine.run(&bars)?;
            if common.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).unwrap_or_default()
                );
            } else {
                report::print_backtest(&common.ticker, &config, &output);
            }
        }
        Command::Walkforward { common, train_years, test_months, step_months } => {
            let config = load_config(&common);
            let bars = load_bars(&common)?;
            let start = common.start.or_else(|| bars.first().map(|b| b.date));
            let end = common.end.or_else(|| bars.last().map(|b| b.date));
            let (Some(start), Some(end)) = (start, end) else {
                return Err(CoreError::InvalidInput("empty bar series".to_string()));
            };
            let evaluator = WalkForwardEvaluator::new(train_years, test_months, step_months);
            let wf_report = evaluator.evaluate(&config, &bars, start, end)?;
            if common.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&wf_report).unwrap_or_default()
                );
            } else {
                report::print_walkforward(&common.ticker, &wf_report);
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
