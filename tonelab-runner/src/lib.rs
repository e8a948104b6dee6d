//! ToneLab Runner — configuration, data loading, orchestration, artifacts.
//!
//! This crate builds on `tonelab-core` to provide:
//! - TOML-backed run configuration with content-addressed run ids
//! - Parquet loading for calls, prices, and factor tables
//! - Seeded synthetic data for smoke runs and demos
//! - The end-to-end pipeline (signal → neutralise → weights → PnL → metrics)
//! - Artifact export (Parquet + CSV + JSON) and a markdown summary report

pub mod config;
pub mod data_loader;
pub mod report;
pub mod result;
pub mod runner;
pub mod synthetic;

pub use config::{BacktestConfig, ConfigError, DataConfig, PnlConfig, ReportConfig};
pub use data_loader::{load_calls, load_factors, load_prices, LoadError};
pub use report::{render_markdown_report, save_run, ArtifactPaths};
pub use result::{BacktestRun, SCHEMA_VERSION};
pub use runner::{
    load_pipeline_data, run_backtest, run_backtest_from_data, PipelineData, RunError,
    RunProgress, StdoutProgress,
};
pub use synthetic::generate_synthetic_data;
