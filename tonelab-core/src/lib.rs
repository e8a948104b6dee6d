//! ToneLab Core — cross-sectional tone-dispersion factor pipeline.
//!
//! This crate contains the computational heart of the backtest:
//! - Domain types (signal panel, weight matrix, price table, daily series)
//! - Signal construction (trade-date mapping, cross-sectional z-score)
//! - Risk-factor neutralization (per-date OLS residuals)
//! - Weight engine (rank targets + sequential adaptive smoothing)
//! - Turnover accounting and horizon PnL
//! - Performance metrics, rolling factor exposures, regime splits
//!
//! Everything here is pure computation over in-memory values; file I/O and
//! orchestration live in `tonelab-runner`.

pub mod domain;
pub mod factor;
pub mod linalg;
pub mod metrics;
pub mod neutralise;
pub mod portfolio;
pub mod stats;

mod error;

pub use error::NoOverlapError;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: pipeline values are Send + Sync.
    ///
    /// Each stage hands an immutable value to the next, and the runner is
    /// free to move results across threads. If any type fails this check,
    /// the build breaks immediately.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::SignalPanel>();
        require_sync::<domain::SignalPanel>();
        require_send::<domain::WeightMatrix>();
        require_sync::<domain::WeightMatrix>();
        require_send::<domain::DailySeries>();
        require_sync::<domain::DailySeries>();
        require_send::<domain::PriceTable>();
        require_sync::<domain::PriceTable>();
        require_send::<domain::FactorTable>();
        require_sync::<domain::FactorTable>();

        require_send::<factor::CallObservation>();
        require_sync::<factor::CallObservation>();

        require_send::<portfolio::PortfolioConfig>();
        require_sync::<portfolio::PortfolioConfig>();
        require_send::<portfolio::ConfigError>();
        require_sync::<portfolio::ConfigError>();

        require_send::<metrics::PerformanceMetrics>();
        require_sync::<metrics::PerformanceMetrics>();
        require_send::<metrics::FactorExposures>();
        require_sync::<metrics::FactorExposures>();
        require_send::<metrics::ConditionalMetrics>();
        require_sync::<metrics::ConditionalMetrics>();

        require_send::<NoOverlapError>();
        require_sync::<NoOverlapError>();
    }
}
