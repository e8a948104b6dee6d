//! Backtest run result assembly.

use crate::config::BacktestConfig;
use chrono::NaiveDate;
use serde::Serialize;
use tonelab_core::domain::{DailySeries, SignalPanel, WeightMatrix};
use tonelab_core::metrics::{ConditionalMetrics, FactorExposures, PerformanceMetrics};

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
///
/// The scalar summary serializes to JSON; the bulk tables (weights, PnL,
/// turnover, neutralized panel) are exported separately as columnar
/// artifacts and skipped here.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestRun {
    /// Schema version for forward-compatible artifact readers.
    pub schema_version: u32,
    /// Content hash of the configuration that produced this run.
    pub run_id: String,
    pub config: BacktestConfig,
    /// True when any input table was synthetically generated.
    pub synthetic: bool,
    /// Raw signal observations after trade-date mapping and z-scoring.
    pub signal_rows: usize,
    /// Observations surviving neutralization.
    pub neutral_rows: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub metrics: PerformanceMetrics,
    /// Annualized information ratio of the PnL series.
    pub information_ratio: f64,
    pub avg_turnover: f64,
    pub max_turnover: f64,
    /// IR discounted by trading activity: ir / (1 + avg_turnover).
    pub turnover_adjusted_ir: f64,
    /// Rolling factor exposures; None when skipped for lack of data.
    pub factor_exposures: Option<FactorExposures>,
    /// Regime-conditional metrics; None when skipped for lack of data.
    pub conditional: Option<ConditionalMetrics>,

    #[serde(skip)]
    pub neutral_panel: SignalPanel,
    #[serde(skip)]
    pub weights: WeightMatrix,
    #[serde(skip)]
    pub pnl: DailySeries,
    #[serde(skip)]
    pub turnover: DailySeries,
}
