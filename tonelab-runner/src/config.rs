//! Serializable backtest configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tonelab_core::portfolio::PortfolioConfig;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Complete configuration for one backtest run.
///
/// Serializes to/from TOML; every section has defaults, so a minimal config
/// file can override a single value. Two runs with identical configs share
/// the same [`RunId`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub data: DataConfig,
    pub portfolio: PortfolioConfig,
    pub pnl: PnlConfig,
    pub report: ReportConfig,
}

/// Input table locations and factor-column selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Earnings-call tone table (date/trade_date, symbol, tone_dispersion).
    pub calls: PathBuf,
    /// Long-form price table (date, symbol, adjClose).
    pub prices: PathBuf,
    /// Daily factor-return table (date plus named factor columns).
    pub factors: PathBuf,
    /// Factor columns used for neutralization.
    pub factor_columns: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            calls: PathBuf::from("data/tone_dispersion.parquet"),
            prices: PathBuf::from("data/stock_prices.parquet"),
            factors: PathBuf::from("data/ff5_daily.parquet"),
            factor_columns: ["mktrf", "smb", "hml", "rmw", "cma", "umd"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// PnL engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PnlConfig {
    /// Forward-return horizon in trading periods.
    pub horizon: usize,
}

impl Default for PnlConfig {
    fn default() -> Self {
        Self { horizon: 5 }
    }
}

/// Optional enrichment analyses in the report stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Trailing window for rolling factor exposures.
    pub rolling_window: usize,
    /// Factor columns regressed against in the exposure analysis.
    pub exposure_factors: Vec<String>,
    /// Factor column used to split returns into regimes.
    pub condition_factor: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            rolling_window: 60,
            exposure_factors: ["mktrf", "smb", "hml", "rmw", "cma"]
                .map(String::from)
                .to_vec(),
            condition_factor: "mktrf".to_string(),
        }
    }
}

/// Errors from configuration validation or file loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("portfolio config: {0}")]
    Portfolio(#[from] tonelab_core::portfolio::ConfigError),
    #[error("forward-return horizon must be at least 1")]
    ZeroHorizon,
    #[error("rolling window must be at least 2, got {0}")]
    RollingWindowTooSmall(usize),
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl BacktestConfig {
    /// Load and validate a TOML config file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on any invalid parameter; nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.portfolio.validate()?;
        if self.pnl.horizon == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if self.report.rolling_window < 2 {
            return Err(ConfigError::RollingWindowTooSmall(self.report.rolling_window));
        }
        Ok(())
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Identical configs map to identical ids, so artifacts from repeated
    /// runs can be recognized and compared.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
