//! Performance metrics — pure functions over a dated return series.
//!
//! Every metric is total: zero-division opportunities (flat series, no
//! downside, no drawdown, no losses) return 0 instead of propagating
//! NaN/Inf. Nothing here holds state; the same series always produces the
//! same record.

use crate::domain::{DailySeries, FactorTable};
use crate::linalg;
use crate::stats;
use chrono::{Datelike, NaiveDate};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Aggregate risk/return diagnostics for one return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub profit_ratio: f64,
    pub monthly_consistency: f64,
}

impl PerformanceMetrics {
    /// Compute the full record from a dated return series.
    pub fn compute(returns: &DailySeries) -> Self {
        let values = returns.values();
        Self {
            total_return: total_return(&values),
            annualized_return: annualized_return(&values),
            annualized_volatility: annualized_volatility(&values),
            sharpe_ratio: sharpe_ratio(&values),
            sortino_ratio: sortino_ratio(&values),
            calmar_ratio: calmar_ratio(&values),
            max_drawdown: max_drawdown(&values),
            win_rate: win_rate(&values),
            profit_ratio: profit_ratio(&values),
            monthly_consistency: monthly_consistency(returns),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Compounded total return: Π(1+r) − 1.
pub fn total_return(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

/// Annualized compounded return: (1 + total)^(252/n) − 1.
///
/// A wipeout (total ≤ −100%) annualizes to −1 rather than NaN.
pub fn annualized_return(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let base = 1.0 + total_return(returns);
    if base <= 0.0 {
        return -1.0;
    }
    base.powf(TRADING_DAYS_PER_YEAR / returns.len() as f64) - 1.0
}

/// Annualized volatility: sample std × √252.
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    stats::std_dev(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Annualized Sharpe ratio: mean/std × √252. Returns 0.0 for a flat series.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    let std = stats::std_dev(returns);
    if std < 1e-15 {
        return 0.0;
    }
    stats::mean(returns) / std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Annualized Sortino ratio: mean over downside-only sample std.
///
/// Returns 0.0 when there are no downside periods, or too few to estimate
/// their deviation.
pub fn sortino_ratio(returns: &[f64]) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if downside.is_empty() {
        return 0.0;
    }
    let downside_std = stats::std_dev(&downside);
    if downside_std < 1e-15 {
        return 0.0;
    }
    stats::mean(returns) / downside_std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Calmar ratio: |annualized return / max drawdown|, 0.0 with no drawdown.
pub fn calmar_ratio(returns: &[f64]) -> f64 {
    let dd = max_drawdown(returns);
    if dd >= 0.0 {
        return 0.0;
    }
    (annualized_return(returns) / dd).abs()
}

/// Maximum drawdown as a non-positive fraction.
///
/// Minimum over time of cumulative-return-over-running-peak minus one;
/// 0.0 for a series that never dips below its running peak.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;

    for r in returns {
        cumulative *= 1.0 + r;
        if cumulative > peak {
            peak = cumulative;
        }
        if peak > 0.0 {
            let dd = cumulative / peak - 1.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Fraction of periods with a strictly positive return.
pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let wins = returns.iter().filter(|r| **r > 0.0).count();
    wins as f64 / returns.len() as f64
}

/// |mean win / mean loss|. Returns 0.0 with no losses (or no wins).
pub fn profit_ratio(returns: &[f64]) -> f64 {
    let wins: Vec<f64> = returns.iter().copied().filter(|r| *r > 0.0).collect();
    let losses: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if wins.is_empty() || losses.is_empty() {
        return 0.0;
    }
    (stats::mean(&wins) / stats::mean(&losses)).abs()
}

/// Fraction of calendar months whose compounded return is positive.
pub fn monthly_consistency(returns: &DailySeries) -> f64 {
    let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for (date, r) in returns.iter() {
        let key = (date.year(), date.month());
        let compounded = by_month.entry(key).or_insert(1.0);
        *compounded *= 1.0 + r;
    }
    if by_month.is_empty() {
        return 0.0;
    }
    let positive = by_month.values().filter(|c| **c > 1.0).count();
    positive as f64 / by_month.len() as f64
}

// ─── Rolling factor exposures ───────────────────────────────────────

/// Rolling regression of portfolio returns on factor returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorExposures {
    pub factor_names: Vec<String>,
    /// Per-date coefficient vectors, intercept excluded, ordered as
    /// `factor_names`. Stamped at the last date of each trailing window.
    pub betas: BTreeMap<NaiveDate, Vec<f64>>,
    pub r_squared: DailySeries,
}

impl FactorExposures {
    pub fn is_empty(&self) -> bool {
        self.betas.is_empty()
    }
}

/// Trailing-window OLS of returns on the factor columns plus an intercept.
///
/// Each estimate uses the `window` observations ending at its stamp date,
/// so no window reaches into the future. Fewer common observations than
/// `window` yields an explicitly empty result, not an error.
pub fn analyze_factor_exposures(
    returns: &DailySeries,
    factors: &FactorTable,
    window: usize,
) -> FactorExposures {
    let mut exposures = FactorExposures {
        factor_names: factors.names().to_vec(),
        betas: BTreeMap::new(),
        r_squared: DailySeries::new(),
    };
    if window < 2 {
        return exposures;
    }

    // Observations on the common date axis, in date order.
    let common: Vec<(NaiveDate, f64, &[f64])> = returns
        .iter()
        .filter_map(|(date, r)| factors.row(date).map(|row| (date, r, row)))
        .collect();
    if common.len() < window {
        return exposures;
    }

    let k = factors.names().len();
    for end in (window - 1)..common.len() {
        let slice = &common[end + 1 - window..=end];
        let mut x = Array2::ones((window, k + 1));
        let mut y = Array1::zeros(window);
        for (i, (_, r, factor_row)) in slice.iter().enumerate() {
            y[i] = *r;
            for (j, f) in factor_row.iter().enumerate() {
                x[[i, j + 1]] = *f;
            }
        }

        let beta = linalg::lstsq(x.view(), y.view());
        let resid = y.clone() - x.dot(&beta);
        let r2 = linalg::r_squared(y.view(), resid.view());

        let stamp = slice[window - 1].0;
        exposures
            .betas
            .insert(stamp, beta.iter().skip(1).copied().collect());
        exposures.r_squared.insert(stamp, r2);
    }
    exposures
}

// ─── Conditional (regime) metrics ───────────────────────────────────

/// Metrics split by a threshold on a conditioning series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalMetrics {
    pub high_regime: PerformanceMetrics,
    pub low_regime: PerformanceMetrics,
    pub all_periods: PerformanceMetrics,
    pub threshold: f64,
    pub high_count: usize,
    pub low_count: usize,
}

/// Split the return series into two regimes by a threshold on the
/// conditioning series (median of the common dates when not given) and
/// compute the full record for each side plus the unconditional record.
///
/// Only dates present in both series participate.
pub fn conditional_metrics(
    returns: &DailySeries,
    condition: &DailySeries,
    threshold: Option<f64>,
) -> ConditionalMetrics {
    let common: Vec<(NaiveDate, f64, f64)> = returns
        .iter()
        .filter_map(|(date, r)| condition.get(date).map(|c| (date, r, c)))
        .collect();

    let condition_values: Vec<f64> = common.iter().map(|(_, _, c)| *c).collect();
    let threshold = threshold.unwrap_or_else(|| stats::median(&condition_values));

    let mut high = DailySeries::new();
    let mut low = DailySeries::new();
    let mut all = DailySeries::new();
    for (date, r, c) in &common {
        all.insert(*date, *r);
        if *c > threshold {
            high.insert(*date, *r);
        } else {
            low.insert(*date, *r);
        }
    }

    ConditionalMetrics {
        high_regime: PerformanceMetrics::compute(&high),
        low_regime: PerformanceMetrics::compute(&low),
        all_periods: PerformanceMetrics::compute(&all),
        threshold,
        high_count: high.len(),
        low_count: low.len(),
    }
}
