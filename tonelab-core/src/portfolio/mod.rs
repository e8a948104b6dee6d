//! Portfolio construction: rank targets, adaptive smoothing, turnover, PnL.
//!
//! The weight engine runs in two passes:
//! - Step A ([`target_weights`]) maps each date's signal cross-section to
//!   dollar-neutral, gross-normalized target weights. Dates are independent.
//! - Step B ([`smooth_weights`]) blends each date's targets with the
//!   previous *smoothed* row, a strictly sequential left-to-right scan.
//!
//! [`build_weights`] is the public entry point combining both.

pub mod config;
pub mod pnl;
pub mod smoothing;
pub mod target;
pub mod turnover;

pub use config::{ConfigError, PortfolioConfig, TieMethod};
pub use pnl::pnl;
pub use smoothing::smooth_weights;
pub use target::{target_row, target_weights};
pub use turnover::turnover;

use crate::domain::{SignalPanel, WeightMatrix};

/// Net exposures smaller than this are treated as zero.
pub(crate) const NET_TOLERANCE: f64 = 1e-10;

/// Build the smoothed weight matrix from a neutralized signal panel.
///
/// Validates the configuration up front, computes per-date targets, and
/// applies the adaptive smoothing scan. With `smoothing == 0` the scan is
/// skipped entirely and the targets are returned unchanged (full turnover
/// each rebalance).
pub fn build_weights(
    panel: &SignalPanel,
    config: &PortfolioConfig,
) -> Result<WeightMatrix, ConfigError> {
    config.validate()?;
    let targets = target_weights(panel, config);
    if config.smoothing == 0.0 {
        return Ok(targets);
    }
    Ok(smooth_weights(&targets, config))
}

/// Scale a row so Σ|w| equals `gross`. All-zero rows are left untouched.
///
/// Dividing per element (rather than premultiplying a reciprocal) keeps the
/// symmetric two-asset case exact: ±m/(2m) is exactly ±0.5.
pub(crate) fn renormalize_gross(row: &mut [f64], gross: f64) {
    let sum_abs: f64 = row.iter().map(|w| w.abs()).sum();
    if sum_abs > 0.0 {
        for w in row.iter_mut() {
            *w = *w / sum_abs * gross;
        }
    }
}

/// Restore Σw = 0 by spreading the excess net over the row in proportion to
/// each weight's magnitude.
///
/// Concentrating the correction on already-large positions preserves the
/// shape of the exposure instead of opening new small positions. A single
/// pass is exact: the correction terms sum to −net.
pub(crate) fn recentre_net(row: &mut [f64]) {
    let net: f64 = row.iter().sum();
    if net.abs() <= NET_TOLERANCE {
        return;
    }
    let sum_abs: f64 = row.iter().map(|w| w.abs()).sum();
    if sum_abs <= 0.0 {
        return;
    }
    for w in row.iter_mut() {
        *w -= net * w.abs() / sum_abs;
    }
}
