//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestResult, run_backtest};
use crate::domain::candle::{find_gaps, format_timestamp};
use crate::domain::config_validation::{RunSettings, load_run_settings};
use crate::domain::error::SigtraderError;
use crate::domain::frame::IndicatorFrame;
use crate::domain::interval::Interval;
use crate::domain::metrics::Metrics;
use crate::domain::optimizer::{Optimized, optimize};
use crate::domain::signal::{SignalFrame, TradeSignal};
use crate::domain::signal_generator::SignalGenerator;
use crate::ports::candle_source::{CandleSource, DataRange};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "Indicator signal backtester for OHLCV candles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate, optimize and backtest trade signals
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        market: Option<String>,
        #[arg(long)]
        interval: Option<Interval>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Write the trade ledger as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Backtest the raw signals without pruning losing round trips
        #[arg(long)]
        no_optimize: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the stored candle range for a market
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        market: Option<String>,
        #[arg(long)]
        interval: Option<Interval>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            market,
            interval,
            data_dir,
            output,
            no_optimize,
        } => {
            let overrides = Overrides {
                market,
                interval,
                data_dir,
            };
            run_backtest_command(&config, overrides, output.as_deref(), no_optimize)
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info {
            config,
            market,
            interval,
        } => run_info(
            &config,
            Overrides {
                market,
                interval,
                data_dir: None,
            },
        ),
    }
}

fn fail(err: SigtraderError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub market: Option<String>,
    pub interval: Option<Interval>,
    pub data_dir: Option<PathBuf>,
}

pub fn load_settings(path: &Path, overrides: Overrides) -> Result<RunSettings, SigtraderError> {
    tracing::info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    let mut settings = load_run_settings(&adapter)?;
    if let Some(market) = overrides.market {
        settings.data.market = Some(market);
    }
    if let Some(interval) = overrides.interval {
        settings.data.interval = interval;
    }
    if let Some(dir) = overrides.data_dir {
        settings.data.dir = dir;
    }
    Ok(settings)
}

/// Everything one backtest run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub signals: SignalFrame,
    pub optimized: Option<Optimized>,
    pub result: BacktestResult,
    pub metrics: Metrics,
}

/// Candles → indicators → signals → optimizer → backtest → metrics.
pub fn run_pipeline(
    source: &dyn CandleSource,
    settings: &RunSettings,
) -> Result<PipelineOutcome, SigtraderError> {
    let market = settings.data.market()?;
    let interval = settings.data.interval;

    let candles = source.fetch_candles(market, interval)?;
    tracing::info!(market, %interval, candles = candles.len(), "loaded candles");
    if candles.is_empty() {
        tracing::warn!(market, %interval, "no candles stored");
        return Err(SigtraderError::NoData {
            market: market.to_string(),
            interval: interval.to_string(),
        });
    }
    let warmup = settings.indicators.warmup();
    if candles.len() <= warmup {
        tracing::warn!(
            candles = candles.len(),
            warmup,
            "not enough candles to get past indicator warm-up"
        );
    }

    let frame = IndicatorFrame::from_candles(&candles, &settings.indicators)?;
    let generator = SignalGenerator::new(settings.indicators.clone())?;
    let signals = generator.signal_frame(&frame)?;

    let optimized = if settings.optimize {
        Some(optimize(&signals)?)
    } else {
        tracing::info!("signal optimization disabled");
        None
    };
    let traded = optimized.as_ref().map(|o| &o.frame).unwrap_or(&signals);

    let result = run_backtest(traded, &settings.backtest)?;
    if result.trades().is_empty() {
        tracing::warn!("backtest made no trades");
    }
    let metrics = Metrics::compute(&result);

    Ok(PipelineOutcome {
        signals,
        optimized,
        result,
        metrics,
    })
}

fn run_backtest_command(
    config_path: &Path,
    overrides: Overrides,
    output: Option<&Path>,
    no_optimize: bool,
) -> ExitCode {
    let mut settings = match load_settings(config_path, overrides) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    if no_optimize {
        settings.optimize = false;
    }

    let source = CsvAdapter::new(settings.data.dir.clone());
    let outcome = match run_pipeline(&source, &settings) {
        Ok(o) => o,
        Err(e) => return fail(e),
    };

    print_summary(&settings, &outcome);

    if let Some(path) = output {
        if let Err(e) = CsvReportAdapter::new().write(&outcome.result, path) {
            return fail(e);
        }
        eprintln!("\nLedger written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

fn print_summary(settings: &RunSettings, outcome: &PipelineOutcome) {
    let metrics = &outcome.metrics;
    let signals = &outcome.signals;

    eprintln!(
        "\n=== {} {} ===",
        settings.data.market.as_deref().unwrap_or_default(),
        settings.data.interval
    );
    eprintln!(
        "Signals:          {} buy, {} sell over {} candles",
        signals.count(TradeSignal::Buy),
        signals.count(TradeSignal::Sell),
        signals.len()
    );
    if let Some(optimized) = &outcome.optimized {
        eprintln!(
            "Optimized:        {} buy, {} sell after {} passes",
            optimized.frame.count(TradeSignal::Buy),
            optimized.frame.count(TradeSignal::Sell),
            optimized.passes
        );
    }
    eprintln!("Initial Capital:  {:.2}", settings.backtest.initial_capital());
    eprintln!("Final Proceeds:   {:.2}", outcome.result.proceeds());
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!("Round Trips:      {}", metrics.round_trips);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Exposure:         {:.1}%", metrics.exposure * 100.0);
    if outcome.result.forced_close {
        eprintln!("(open position closed at the last candle)");
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let settings = match load_settings(config_path, Overrides::default()) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let data = &settings.data;
    eprintln!("\n[data]");
    eprintln!("  dir:      {}", data.dir.display());
    eprintln!(
        "  market:   {}",
        data.market.as_deref().unwrap_or("(not set, pass --market)")
    );
    eprintln!("  interval: {}", data.interval);

    eprintln!("\n[backtest]");
    eprintln!("  initial_capital:  {}", settings.backtest.initial_capital());
    eprintln!("  transaction_cost: {}", settings.backtest.transaction_cost());
    eprintln!("  optimize:         {}", settings.optimize);

    let ind = &settings.indicators;
    eprintln!("\n[indicators]");
    eprintln!(
        "  bollinger: period {}, std_dev {}",
        ind.bollinger.period, ind.bollinger.std_dev
    );
    eprintln!("  ema:       fast {}, slow {}", ind.ema.fast, ind.ema.slow);
    eprintln!(
        "  macd:      fast {}, slow {}, signal {}",
        ind.macd.fast, ind.macd.slow, ind.macd.signal
    );
    eprintln!(
        "  rsi:       period {}, oversold {}, overbought {}, margin {}",
        ind.rsi.period, ind.rsi.oversold, ind.rsi.overbought, ind.rsi.margin
    );
    eprintln!("  warm-up:   {} candles", ind.warmup());

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path, overrides: Overrides) -> ExitCode {
    let settings = match load_settings(config_path, overrides) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let interval = settings.data.interval;
    let source = CsvAdapter::new(settings.data.dir.clone());

    let markets = match settings.data.market.clone() {
        Some(m) => vec![m],
        None => match source.list_markets(interval) {
            Ok(m) => m,
            Err(e) => return fail(e),
        },
    };
    if markets.is_empty() {
        eprintln!(
            "No {} candle files in {}",
            interval,
            settings.data.dir.display()
        );
        return ExitCode::SUCCESS;
    }

    for market in &markets {
        let candles = match source.fetch_candles(market, interval) {
            Ok(c) => c,
            Err(SigtraderError::NoData { .. }) => {
                eprintln!("{}-{}: no data found", market, interval);
                continue;
            }
            Err(e) => return fail(e),
        };
        let Some(range) = DataRange::of(&candles) else {
            eprintln!("{}-{}: no data found", market, interval);
            continue;
        };

        println!(
            "{}-{}: {} candles, {} to {}",
            market,
            interval,
            range.count,
            format_timestamp(range.first),
            format_timestamp(range.last)
        );

        let gaps = find_gaps(&candles, interval);
        if !gaps.is_empty() {
            let missing: i64 = gaps.iter().map(|g| g.missing).sum();
            println!("  {} gaps, {} candles missing", gaps.len(), missing);
            for gap in &gaps {
                println!(
                    "  {} -> {} ({} missing)",
                    format_timestamp(gap.from),
                    format_timestamp(gap.to),
                    gap.missing
                );
            }
        }
    }
    ExitCode::SUCCESS
}
