//! StratLab CLI — single runs, config-driven batches, and the strategy catalog.
//!
//! Commands:
//! - `run <STRATEGY>` — backtest one strategy and write its artifacts
//! - `batch` — run every strategy in a TOML config (or the built-in sample batch)
//! - `strategies` — list strategy keys and default parameters

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use stratlab_core::data::{DataSource, SyntheticKind};
use stratlab_core::strategy::{StrategyParams, StrategySpec};
use stratlab_runner::config::{BacktestSection, DataSection, StrategyEntry};
use stratlab_runner::{
    init_tracing, load_series, run_backtest, run_batch, save_artifacts, save_batch_artifacts,
    BacktestConfig, BacktestReport, BatchReport, LogFormat,
};

#[derive(Parser)]
#[command(
    name = "stratlab",
    about = "StratLab CLI — single-instrument strategy backtester"
)]
struct Cli {
    /// Log filter (e.g. `info`, `stratlab_runner=debug`). STRATLAB_LOG overrides it.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format: plain or json.
    #[arg(long, global = true, default_value = "plain")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one strategy and write its artifacts.
    Run(RunArgs),
    /// Run every strategy in a batch config.
    Batch {
        /// TOML config file. Defaults to BuyHold, EMA 5/20 and SMA 10/20 on the sample series.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "outputs")]
        output_dir: PathBuf,
    },
    /// List strategy keys and their default parameters.
    Strategies,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Strategy key: BuyHold, SMAGoldenCross, EMAGoldenCross, MACDStrategy, RSIStrategy.
    strategy: String,

    #[arg(long, default_value = "TSM")]
    symbol: String,

    /// Start date (YYYY-MM-DD).
    #[arg(long, default_value = "2015-01-01")]
    start: NaiveDate,

    /// End date (YYYY-MM-DD).
    #[arg(long, default_value = "2019-12-31")]
    end: NaiveDate,

    /// Data source.
    #[arg(long, value_enum, default_value_t = Source::Yahoo)]
    source: Source,

    /// OHLCV file for `--source csv`.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Synthetic generator for `--source synthetic`.
    #[arg(long, value_enum, default_value_t = Pattern::RandomWalk)]
    pattern: Pattern,

    /// Length of the synthetic `sample` and `dips` series.
    #[arg(long, default_value_t = 100)]
    bars: usize,

    /// Starting cash.
    #[arg(long, default_value_t = 10_000.0)]
    cash: f64,

    /// Proportional commission per fill (0.001 = 0.1%).
    #[arg(long, default_value_t = 0.0)]
    commission: f64,

    #[arg(long)]
    fast: Option<usize>,
    #[arg(long)]
    slow: Option<usize>,
    #[arg(long)]
    signal: Option<usize>,
    #[arg(long)]
    period: Option<usize>,
    #[arg(long)]
    overbought: Option<f64>,
    #[arg(long)]
    oversold: Option<f64>,

    /// Output directory for artifacts.
    #[arg(long, default_value = "outputs")]
    output_dir: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Source {
    Yahoo,
    Csv,
    Synthetic,
}

impl From<Source> for DataSource {
    fn from(source: Source) -> Self {
        match source {
            Source::Yahoo => DataSource::Yahoo,
            Source::Csv => DataSource::Csv,
            Source::Synthetic => DataSource::Synthetic,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Pattern {
    Sample,
    Dips,
    /// Seeded random walk spanning the requested dates.
    #[value(name = "random_walk", alias = "random-walk")]
    RandomWalk,
}

impl From<Pattern> for SyntheticKind {
    fn from(pattern: Pattern) -> Self {
        match pattern {
            Pattern::Sample => SyntheticKind::Sample,
            Pattern::Dips => SyntheticKind::Dips,
            Pattern::RandomWalk => SyntheticKind::RandomWalk,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Run(args) => run_cmd(args),
        Commands::Batch { config, output_dir } => batch_cmd(config.as_deref(), &output_dir),
        Commands::Strategies => {
            list_strategies();
            Ok(())
        }
    }
}

fn run_cmd(args: RunArgs) -> Result<()> {
    let params = StrategyParams {
        fast: args.fast,
        slow: args.slow,
        signal: args.signal,
        period: args.period,
        overbought: args.overbought,
        oversold: args.oversold,
    };
    let spec = StrategySpec::from_key(&args.strategy)?;
    let name = spec.key();
    let entry = StrategyEntry::new(name, &args.strategy, params);

    let config = BacktestConfig {
        backtest: BacktestSection {
            initial_cash: args.cash,
            commission_rate: args.commission,
            timeout_secs: None,
        },
        data: DataSection {
            source: args.source.into(),
            symbol: args.symbol,
            start: args.start,
            end: args.end,
            path: args.csv,
            pattern: args.pattern.into(),
            bars: args.bars,
        },
        strategies: vec![entry.clone()],
    };
    config.validate()?;
    let spec = entry.resolve()?;

    let series = load_series(&config.data)
        .with_context(|| format!("failed to load data for {}", config.data.symbol))?;
    let report = run_backtest(name, &spec, &series, &config.engine_config())?;

    print_summary(&report);

    let paths = save_artifacts(&report, &args.output_dir)?;
    println!("Artifacts saved under: {}", args.output_dir.display());
    info!(manifest = %paths.manifest.display(), "artifacts written");
    Ok(())
}

fn batch_cmd(config_path: Option<&Path>, output_dir: &Path) -> Result<()> {
    let config = match config_path {
        Some(path) => BacktestConfig::from_file(path)
            .with_context(|| format!("invalid batch config {}", path.display()))?,
        None => BacktestConfig::default_batch(),
    };

    let batch = run_batch(&config).context("failed to load batch data")?;
    print_batch(&batch);

    let summary = save_batch_artifacts(&batch, &config.data.symbol, output_dir)?;
    println!("Batch summary saved to: {}", summary.display());

    if !batch.all_succeeded() {
        for outcome in &batch.outcomes {
            if let Err(e) = &outcome.result {
                eprintln!("Error for {}: {e}", outcome.name);
            }
        }
        std::process::exit(1);
    }
    Ok(())
}

fn list_strategies() {
    println!("{:<16} {}", "Strategy", "Default parameters");
    println!("{}", "-".repeat(60));
    for spec in StrategySpec::catalog() {
        let params = spec.describe_params();
        let params = if params.is_empty() { "-".to_string() } else { params };
        println!("{:<16} {}", spec.key(), params);
    }
}

fn fmt_opt(value: Option<f64>, suffix: &str) -> String {
    value
        .map(|v| format!("{v:.2}{suffix}"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn print_summary(report: &BacktestReport) {
    let p = &report.performance;
    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:          {}", report.name);
    println!("Symbol:            {}", report.symbol);
    println!("Period:            {} to {}", report.start, report.end);
    println!("Bars:              {}", report.bar_count);
    println!();
    println!("--- Performance ---");
    println!("Total Return:      {:.2}%", p.total_return_pct);
    println!("Annualized Return: {}", fmt_opt(p.annualized_return_pct, "%"));
    println!("Sharpe Ratio:      {}", fmt_opt(p.sharpe, ""));
    println!("Max Drawdown:      {:.2}%", p.max_drawdown_pct);
    println!("Total Trades:      {}", p.total_trades);
    println!("Final Equity:      {:.2}", p.final_equity);
    if p.rejected_orders > 0 {
        println!("WARNING: {} order(s) rejected", p.rejected_orders);
    }
    println!();
}

fn print_batch(batch: &BatchReport) {
    println!();
    println!(
        "{:<28} {:>8} {:>10} {:>8} {:>8} {:>14}",
        "Strategy", "Trades", "Return %", "Sharpe", "MaxDD %", "Final Equity"
    );
    println!("{}", "-".repeat(81));
    for outcome in &batch.outcomes {
        match &outcome.result {
            Ok(report) => {
                let p = &report.performance;
                println!(
                    "{:<28} {:>8} {:>10.2} {:>8} {:>8.2} {:>14.2}",
                    outcome.name,
                    p.total_trades,
                    p.total_return_pct,
                    fmt_opt(p.sharpe, ""),
                    p.max_drawdown_pct,
                    p.final_equity
                );
            }
            Err(e) => println!("{:<28} FAILED: {e}", outcome.name),
        }
    }
    println!();
}
