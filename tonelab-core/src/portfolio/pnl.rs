//! Horizon PnL from lagged weights and forward price moves.

use crate::domain::{DailySeries, PriceTable, WeightMatrix};
use crate::NoOverlapError;

/// Realized portfolio return series.
///
/// The return recorded at weight-date t covers the move from t to t+H on
/// the price table's own date axis, earned by the weights decided at the
/// *previous* weight date — a one-period implementation delay that rules
/// out lookahead. Dates are dropped when:
/// - they are the first weight date (no position was held into them),
/// - they are missing from the price axis,
/// - no held symbol has a valid H-period forward price change (gaps, or
///   fewer than H rows remaining at the end of the series).
///
/// An empty weight matrix propagates as an empty series; a weight matrix
/// whose symbols never appear in the price table is a wiring error and
/// raises [`NoOverlapError`].
pub fn pnl(
    weights: &WeightMatrix,
    prices: &PriceTable,
    horizon: usize,
) -> Result<DailySeries, NoOverlapError> {
    if weights.is_empty() {
        return Ok(DailySeries::new());
    }

    // Columns present on both axes: (weight column, price column)
    let common: Vec<(usize, usize)> = weights
        .symbols()
        .iter()
        .enumerate()
        .filter_map(|(w_idx, symbol)| {
            prices.symbol_index(symbol).map(|p_idx| (w_idx, p_idx))
        })
        .collect();
    if common.is_empty() {
        return Err(NoOverlapError {
            left: "weight matrix",
            right: "price table",
            axis: "symbol",
        });
    }

    let mut series = DailySeries::new();
    let mut held: Option<&[f64]> = None;

    for (date, row) in weights.rows() {
        let previous = held.replace(row);
        let Some(held_row) = previous else {
            continue;
        };
        let Some(pos) = prices.date_position(date) else {
            continue;
        };
        let Some(start_prices) = prices.row_at(pos) else {
            continue;
        };
        let Some(end_prices) = prices.row_at(pos + horizon) else {
            continue;
        };

        let mut portfolio_return = 0.0;
        let mut valid = 0usize;
        for &(w_idx, p_idx) in &common {
            let (Some(p0), Some(p1)) = (start_prices[p_idx], end_prices[p_idx]) else {
                continue;
            };
            if p0 <= 0.0 {
                continue;
            }
            portfolio_return += held_row[w_idx] * (p1 / p0 - 1.0);
            valid += 1;
        }
        if valid > 0 {
            series.insert(date, portfolio_return);
        }
    }
    Ok(series)
}
