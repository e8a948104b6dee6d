//! Step B: sequential adaptive smoothing of target weights.
//!
//! Each date's smoothed row is a per-asset blend of that date's target with
//! the *previous smoothed row*, so the pass is a strict left-to-right scan
//! over dates: it cannot be vectorized across time. Assets whose target
//! moved sharply give up part of their retention and track the new target
//! faster; stable assets keep more of the stale weight and trade less.

use super::{recentre_net, renormalize_gross, PortfolioConfig};
use crate::domain::WeightMatrix;
use crate::stats;

/// Retention reduction granted to assets flagged as significant movers.
const FAST_ADJUST: f64 = 0.25;

/// Smooth a target weight matrix into the final portfolio sequence.
///
/// The first date passes through unchanged; every later row blends with its
/// predecessor, then is re-centred to Σw = 0 and re-scaled to the gross
/// target. Re-centring happens before the gross rescale because a uniform
/// scale preserves a zero net exactly, while the reverse order leaves a
/// gross error quadratic in the net correction.
pub fn smooth_weights(targets: &WeightMatrix, config: &PortfolioConfig) -> WeightMatrix {
    let mut out = WeightMatrix::new(targets.symbols().to_vec());
    let mut prev: Option<Vec<f64>> = None;

    for (date, target) in targets.rows() {
        let row = match &prev {
            None => target.to_vec(),
            Some(prev_row) => blend_row(target, prev_row, config),
        };
        out.push_row(date, row.clone());
        prev = Some(row);
    }
    out
}

/// Blend one date's target with the previous smoothed row.
fn blend_row(target: &[f64], prev: &[f64], config: &PortfolioConfig) -> Vec<f64> {
    let deltas: Vec<f64> = target
        .iter()
        .zip(prev)
        .map(|(t, p)| (t - p).abs())
        .collect();
    let coefficients = adaptive_coefficients(&deltas, config);

    let mut blended: Vec<f64> = target
        .iter()
        .zip(prev)
        .zip(&coefficients)
        .map(|((t, p), c)| (1.0 - c) * t + c * p)
        .collect();

    recentre_net(&mut blended);
    renormalize_gross(&mut blended, config.gross);
    blended
}

/// Per-asset retention coefficients for one date.
///
/// The significance threshold is the configured quantile of the date's |Δ|
/// cross-section; assets strictly above it get `smoothing − 0.25` (floored
/// at zero), the rest keep the base `smoothing`. When every Δ is equal the
/// strict comparison flags nothing and the whole row retains at the base
/// rate.
fn adaptive_coefficients(deltas: &[f64], config: &PortfolioConfig) -> Vec<f64> {
    let threshold = stats::quantile(deltas, config.significance_quantile);
    let fast = (config.smoothing - FAST_ADJUST).max(0.0);
    deltas
        .iter()
        .map(|d| if *d > threshold { fast } else { config.smoothing })
        .collect()
}
