//! Step A: per-date target weights, independent of history.

use super::{recentre_net, renormalize_gross, PortfolioConfig, TieMethod};
use crate::domain::{SignalPanel, WeightMatrix};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Compute target weights for every date in the panel.
///
/// Each date is a pure function of its own cross-section, so the per-date
/// work runs in parallel; only the smoothing pass is sequential.
pub fn target_weights(panel: &SignalPanel, config: &PortfolioConfig) -> WeightMatrix {
    let symbols = panel.symbols();
    let column: HashMap<&str, usize> = symbols
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();

    let dates: Vec<NaiveDate> = panel.dates().collect();
    let rows: Vec<(NaiveDate, Vec<f64>)> = dates
        .par_iter()
        .map(|&date| {
            let mut full = vec![0.0; symbols.len()];
            if let Some(cross_section) = panel.cross_section(date) {
                let values: Vec<f64> = cross_section.values().copied().collect();
                let weights = target_row(&values, config);
                for (symbol, w) in cross_section.keys().zip(weights) {
                    full[column[symbol.as_str()]] = w;
                }
            }
            (date, full)
        })
        .collect();

    let mut matrix = WeightMatrix::new(symbols);
    for (date, row) in rows {
        matrix.push_row(date, row);
    }
    matrix
}

/// Target weights for a single cross-section, in input order.
///
/// Rank → centre → compress → re-centre → normalize. Ties break the exact
/// antisymmetry of the centred ranks once the power map is applied, so the
/// same magnitude-proportional correction used by the smoothing pass
/// restores Σw = 0 before the gross rescale (which preserves a zero net
/// exactly).
///
/// Degenerate cross-sections (fewer than two assets, or every value tied
/// under average ranking) cannot satisfy both constraints and yield an
/// all-zero row rather than NaN.
pub fn target_row(values: &[f64], config: &PortfolioConfig) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let ranks = rank(values, config.tie_method);
    let nf = n as f64;
    let mut weights: Vec<f64> = ranks
        .iter()
        .map(|r| {
            let centred = (2.0 * r - nf - 1.0) / nf;
            centred.signum() * centred.abs().powf(config.compression_exponent)
        })
        .collect();

    let sum_abs: f64 = weights.iter().map(|w| w.abs()).sum();
    if sum_abs <= 0.0 {
        return vec![0.0; n];
    }
    recentre_net(&mut weights);
    renormalize_gross(&mut weights, config.gross);
    weights
}

/// Ranks 1..=n over `values` with the configured tie handling.
fn rank(values: &[f64], tie_method: TieMethod) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    // Stable sort keeps encounter order within ties.
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; n];
    match tie_method {
        TieMethod::FirstSeen => {
            for (pos, &idx) in order.iter().enumerate() {
                ranks[idx] = (pos + 1) as f64;
            }
        }
        TieMethod::Average => {
            let mut start = 0;
            while start < n {
                let mut end = start;
                while end + 1 < n && values[order[end + 1]] == values[order[start]] {
                    end += 1;
                }
                // Mean of ranks (start+1)..=(end+1)
                let avg = (start + end + 2) as f64 / 2.0;
                for &idx in &order[start..=end] {
                    ranks[idx] = avg;
                }
                start = end + 1;
            }
        }
    }
    ranks
}
