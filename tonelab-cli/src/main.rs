//! ToneLab CLI — earnings-call tone-dispersion backtest pipeline.
//!
//! Commands:
//! - `run` — execute the full pipeline from Parquet inputs (or synthetic
//!   data) and export artifacts plus a markdown report

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tonelab_runner::runner::{run_backtest_from_data, StdoutProgress};
use tonelab_runner::{
    generate_synthetic_data, load_pipeline_data, save_run, BacktestConfig, PipelineData,
};

#[derive(Parser)]
#[command(
    name = "tonelab",
    about = "ToneLab CLI — earnings-call tone-dispersion backtest"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the backtest and export artifacts.
    Run {
        /// Path to a TOML config file. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Earnings-call tone table (Parquet).
        #[arg(long)]
        calls: Option<PathBuf>,

        /// Long-form price table (Parquet).
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Daily factor-return table (Parquet).
        #[arg(long)]
        factors: Option<PathBuf>,

        /// Target gross exposure.
        #[arg(long)]
        gross: Option<f64>,

        /// Base smoothing retention in [0, 1].
        #[arg(long)]
        smoothing: Option<f64>,

        /// Forward-return horizon in trading periods.
        #[arg(long)]
        horizon: Option<usize>,

        /// Run on seeded synthetic data instead of the input tables.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Seed for synthetic data generation.
        #[arg(long, default_value_t = 7)]
        seed: u64,

        /// Output directory for artifacts.
        #[arg(long, default_value = "outputs")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            calls,
            prices,
            factors,
            gross,
            smoothing,
            horizon,
            synthetic,
            seed,
            output_dir,
        } => {
            let mut config = match config {
                Some(path) => BacktestConfig::from_toml_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => BacktestConfig::default(),
            };
            if let Some(calls) = calls {
                config.data.calls = calls;
            }
            if let Some(prices) = prices {
                config.data.prices = prices;
            }
            if let Some(factors) = factors {
                config.data.factors = factors;
            }
            if let Some(gross) = gross {
                config.portfolio.gross = gross;
            }
            if let Some(smoothing) = smoothing {
                config.portfolio.smoothing = smoothing;
            }
            if let Some(horizon) = horizon {
                config.pnl.horizon = horizon;
            }
            config.validate()?;

            let data: PipelineData = if synthetic {
                println!("generating synthetic data (seed {seed})…");
                generate_synthetic_data(
                    &["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG", "HHH"],
                    252,
                    seed,
                )
                .into()
            } else {
                load_pipeline_data(&config)?
            };
            if data.calls.is_empty() {
                bail!("no call observations loaded; nothing to backtest");
            }

            let run = run_backtest_from_data(&config, &data, Some(&StdoutProgress))?;

            println!();
            println!("Run {}", run.run_id);
            println!(
                "  {} signal rows, {} after neutralization",
                run.signal_rows, run.neutral_rows
            );
            println!("  IR ({}-day): {:.3}", config.pnl.horizon, run.information_ratio);
            println!(
                "  Avg turnover: {:.4} (max {:.4})",
                run.avg_turnover, run.max_turnover
            );
            println!("  Turnover-adjusted IR: {:.4}", run.turnover_adjusted_ir);
            println!("  Sharpe: {:.3}", run.metrics.sharpe_ratio);
            println!("  Max drawdown: {:+.2}%", run.metrics.max_drawdown * 100.0);
            println!("  Win rate: {:.1}%", run.metrics.win_rate * 100.0);

            let paths = save_run(&output_dir, &run)?;
            println!();
            println!("Artifacts in {}", output_dir.display());
            println!("  report: {}", paths.report_markdown.display());
            println!("  metrics: {}", paths.metrics_json.display());
            println!("  weights: {}", paths.weights_parquet.display());

            Ok(())
        }
    }
}
