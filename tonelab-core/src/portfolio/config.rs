//! Weight-engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How tied signal values are ranked within a cross-section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieMethod {
    /// Tied values receive the mean of the ranks they would occupy, so
    /// identical signals get identical weights.
    #[default]
    Average,
    /// Tied values are ranked in encounter order.
    FirstSeen,
}

/// Parameters of the weight engine.
///
/// Defaults follow the production settings: unit gross, 0.75 retention,
/// 0.75 compression exponent, average-rank ties, 75th-percentile
/// significance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Target gross exposure Σ|w| per date.
    pub gross: f64,
    /// Base retention fraction φ of the previous smoothed row.
    pub smoothing: f64,
    /// Sign-preserving exponent applied to the centred rank.
    pub compression_exponent: f64,
    /// Tie handling for within-date ranking.
    pub tie_method: TieMethod,
    /// Quantile of the per-asset weight change marking a significant move.
    pub significance_quantile: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            gross: 1.0,
            smoothing: 0.75,
            compression_exponent: 0.75,
            tie_method: TieMethod::Average,
            significance_quantile: 0.75,
        }
    }
}

/// Invalid weight-engine parameter. Raised before any computation; values
/// are never silently clamped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("smoothing must lie in [0, 1], got {0}")]
    SmoothingOutOfRange(f64),
    #[error("gross exposure target must be positive, got {0}")]
    NonPositiveGross(f64),
    #[error("compression exponent must be positive, got {0}")]
    NonPositiveExponent(f64),
    #[error("significance quantile must lie in [0, 1], got {0}")]
    QuantileOutOfRange(f64),
}

impl PortfolioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.smoothing.is_finite() || !(0.0..=1.0).contains(&self.smoothing) {
            return Err(ConfigError::SmoothingOutOfRange(self.smoothing));
        }
        if !self.gross.is_finite() || self.gross <= 0.0 {
            return Err(ConfigError::NonPositiveGross(self.gross));
        }
        if !self.compression_exponent.is_finite() || self.compression_exponent <= 0.0 {
            return Err(ConfigError::NonPositiveExponent(self.compression_exponent));
        }
        if !self.significance_quantile.is_finite()
            || !(0.0..=1.0).contains(&self.significance_quantile)
        {
            return Err(ConfigError::QuantileOutOfRange(self.significance_quantile));
        }
        Ok(())
    }

    /// Shorthand used throughout the tests.
    pub fn with_smoothing(smoothing: f64) -> Self {
        Self {
            smoothing,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PortfolioConfig::default().validate().is_ok());
    }

    #[test]
    fn smoothing_bounds_are_inclusive() {
        assert!(PortfolioConfig::with_smoothing(0.0).validate().is_ok());
        assert!(PortfolioConfig::with_smoothing(1.0).validate().is_ok());
    }

    #[test]
    fn smoothing_outside_unit_interval_rejected() {
        let err = PortfolioConfig::with_smoothing(1.2).validate().unwrap_err();
        assert_eq!(err, ConfigError::SmoothingOutOfRange(1.2));
        assert!(PortfolioConfig::with_smoothing(-0.1).validate().is_err());
        assert!(PortfolioConfig::with_smoothing(f64::NAN).validate().is_err());
    }

    #[test]
    fn non_positive_gross_rejected() {
        let config = PortfolioConfig {
            gross: 0.0,
            ..PortfolioConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveGross(_))
        ));
    }

    #[test]
    fn bad_exponent_and_quantile_rejected() {
        let config = PortfolioConfig {
            compression_exponent: -1.0,
            ..PortfolioConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveExponent(_))
        ));

        let config = PortfolioConfig {
            significance_quantile: 1.5,
            ..PortfolioConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::QuantileOutOfRange(_))
        ));
    }

    #[test]
    fn toml_round_trip_with_defaults() {
        let parsed: PortfolioConfig = toml::from_str("smoothing = 0.5").unwrap();
        assert_eq!(parsed.smoothing, 0.5);
        assert_eq!(parsed.gross, 1.0);
        assert_eq!(parsed.tie_method, TieMethod::Average);
    }
}
