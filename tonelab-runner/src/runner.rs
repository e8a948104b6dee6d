//! Pipeline orchestration — signal → neutralise → weights → PnL → metrics.
//!
//! Two entry points:
//! - [`run_backtest`]: loads the input tables from disk, then runs. Used by
//!   the CLI for real data.
//! - [`run_backtest_from_data`]: takes pre-loaded tables — no I/O. Used for
//!   synthetic runs and tests.
//!
//! The core stages are all-or-nothing; the enrichment stages (rolling
//! factor exposures, regime split) are optional and skipped with a printed
//! notice when there is not enough data to support them.

use thiserror::Error;

use tonelab_core::domain::{FactorTable, PriceTable};
use tonelab_core::factor::{build_signal_panel, CallObservation};
use tonelab_core::metrics::{
    analyze_factor_exposures, conditional_metrics, sharpe_ratio, PerformanceMetrics,
};
use tonelab_core::neutralise::neutralise;
use tonelab_core::portfolio::{build_weights, pnl, turnover};
use tonelab_core::NoOverlapError;

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_calls, load_factors, load_prices, LoadError};
use crate::result::{BacktestRun, SCHEMA_VERSION};
use crate::synthetic::SyntheticData;

/// Minimum common observations required for the regime split.
const MIN_CONDITION_OBS: usize = 20;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("overlap error: {0}")]
    NoOverlap(#[from] NoOverlapError),
}

/// Pre-loaded input tables for one run.
#[derive(Debug, Clone)]
pub struct PipelineData {
    pub calls: Vec<CallObservation>,
    pub prices: PriceTable,
    pub factors: FactorTable,
    /// True when the tables were synthetically generated.
    pub synthetic: bool,
}

impl From<SyntheticData> for PipelineData {
    fn from(data: SyntheticData) -> Self {
        Self {
            calls: data.calls,
            prices: data.prices,
            factors: data.factors,
            synthetic: true,
        }
    }
}

/// Stage progress callback so the CLI can narrate long runs.
pub trait RunProgress {
    fn on_stage(&self, step: usize, total: usize, label: &str);
}

/// Prints `[step/total] label…` to stdout.
pub struct StdoutProgress;

impl RunProgress for StdoutProgress {
    fn on_stage(&self, step: usize, total: usize, label: &str) {
        println!("[{step}/{total}] {label}…");
    }
}

/// Load the three input tables named by the config.
pub fn load_pipeline_data(config: &BacktestConfig) -> Result<PipelineData, LoadError> {
    Ok(PipelineData {
        calls: load_calls(&config.data.calls)?,
        prices: load_prices(&config.data.prices)?,
        factors: load_factors(&config.data.factors, &config.data.factor_columns)?,
        synthetic: false,
    })
}

/// Run a backtest end to end, loading inputs from disk.
pub fn run_backtest(
    config: &BacktestConfig,
    progress: Option<&dyn RunProgress>,
) -> Result<BacktestRun, RunError> {
    config.validate()?;
    let data = load_pipeline_data(config)?;
    run_backtest_from_data(config, &data, progress)
}

/// Run a backtest on pre-loaded tables — no I/O.
pub fn run_backtest_from_data(
    config: &BacktestConfig,
    data: &PipelineData,
    progress: Option<&dyn RunProgress>,
) -> Result<BacktestRun, RunError> {
    config.validate()?;
    let total = 4;

    if let Some(p) = progress {
        p.on_stage(1, total, "building signal panel");
    }
    let raw_panel = build_signal_panel(&data.calls);

    if let Some(p) = progress {
        p.on_stage(2, total, "neutralising against risk factors");
    }
    let neutral_panel = neutralise(&raw_panel, &data.factors)?;

    if let Some(p) = progress {
        p.on_stage(3, total, "building smoothed weights");
    }
    let weights = build_weights(&neutral_panel, &config.portfolio)
        .map_err(ConfigError::Portfolio)
        .map_err(RunError::Config)?;
    let turnover_series = turnover(&weights);

    if let Some(p) = progress {
        p.on_stage(4, total, "computing PnL and metrics");
    }
    let pnl_series = pnl(&weights, &data.prices, config.pnl.horizon)?;
    let metrics = PerformanceMetrics::compute(&pnl_series);
    let information_ratio = sharpe_ratio(&pnl_series.values());
    let avg_turnover = turnover_series.mean();

    // Optional enrichment: each stage may be skipped, never fail the run.
    let exposure_factors = data.factors.select(&config.report.exposure_factors);
    let factor_exposures = if exposure_factors.names().is_empty() {
        eprintln!("note: skipping factor exposures (no configured factor column is present)");
        None
    } else {
        let exposures = analyze_factor_exposures(
            &pnl_series,
            &exposure_factors,
            config.report.rolling_window,
        );
        if exposures.is_empty() {
            eprintln!(
                "note: skipping factor exposures ({} observations < window {})",
                pnl_series.len(),
                config.report.rolling_window
            );
            None
        } else {
            Some(exposures)
        }
    };

    let conditional = match data.factors.column(&config.report.condition_factor) {
        None => {
            eprintln!(
                "note: skipping conditional metrics (no '{}' column)",
                config.report.condition_factor
            );
            None
        }
        Some(condition) => {
            let overlap = pnl_series.intersect(&condition).len();
            if overlap < MIN_CONDITION_OBS {
                eprintln!(
                    "note: skipping conditional metrics ({overlap} common observations < {MIN_CONDITION_OBS})"
                );
                None
            } else {
                Some(conditional_metrics(&pnl_series, &condition, None))
            }
        }
    };

    let start_date = weights.dates().next();
    let end_date = weights.dates().last();

    Ok(BacktestRun {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        config: config.clone(),
        synthetic: data.synthetic,
        signal_rows: raw_panel.len(),
        neutral_rows: neutral_panel.len(),
        start_date,
        end_date,
        metrics,
        information_ratio,
        avg_turnover,
        max_turnover: turnover_series.max(),
        turnover_adjusted_ir: information_ratio / (1.0 + avg_turnover),
        factor_exposures,
        conditional,
        neutral_panel,
        weights,
        pnl: pnl_series,
        turnover: turnover_series,
    })
}
