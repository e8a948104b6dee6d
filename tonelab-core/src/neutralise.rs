//! Cross-sectional risk-factor neutralization.
//!
//! Each date's signal cross-section is regressed on that date's factor
//! returns plus an intercept, and the residuals replace the raw scores.
//! Within a single date every asset shares the same factor row, so the
//! design is rank-deficient by construction; the least-squares core handles
//! that by letting the intercept absorb the fit (see [`crate::linalg`]).

use crate::domain::{FactorTable, SignalPanel};
use crate::linalg;
use crate::NoOverlapError;
use ndarray::{Array1, Array2};

/// Regress the signal on the daily factor returns and return the residuals.
///
/// Dates missing from the factor table are dropped. If the panel and the
/// factor table share no dates at all, that is a wiring error and surfaces
/// as [`NoOverlapError`]; an empty input panel instead propagates as an
/// empty result.
pub fn neutralise(
    panel: &SignalPanel,
    factors: &FactorTable,
) -> Result<SignalPanel, NoOverlapError> {
    if panel.is_empty() {
        return Ok(SignalPanel::new());
    }

    let common: Vec<_> = panel
        .dates()
        .filter(|date| factors.contains_date(*date))
        .collect();
    if common.is_empty() {
        return Err(NoOverlapError {
            left: "signal panel",
            right: "factor table",
            axis: "date",
        });
    }

    let k = factors.names().len();
    let mut out = SignalPanel::new();
    for date in common {
        let Some(cross_section) = panel.cross_section(date) else {
            continue;
        };
        let Some(factor_row) = factors.row(date) else {
            continue;
        };
        let n = cross_section.len();

        // Intercept first, then the factor columns (constant within a date).
        let mut x = Array2::ones((n, k + 1));
        for (j, value) in factor_row.iter().enumerate() {
            x.column_mut(j + 1).fill(*value);
        }
        let y: Array1<f64> = cross_section.values().copied().collect();

        let resid = linalg::residuals(x.view(), y.view());
        for (symbol, r) in cross_section.keys().zip(resid.iter()) {
            out.insert(date, symbol.clone(), *r);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn factor_table(days: &[u32]) -> FactorTable {
        let mut t = FactorTable::new(vec!["mktrf".into(), "smb".into()]);
        for (i, day) in days.iter().enumerate() {
            t.insert(d(*day), vec![0.01 * (i as f64 + 1.0), -0.002]);
        }
        t
    }

    #[test]
    fn residuals_have_zero_cross_sectional_mean() {
        let mut panel = SignalPanel::new();
        panel.insert(d(2), "AAA", 1.4);
        panel.insert(d(2), "BBB", -0.3);
        panel.insert(d(2), "CCC", 0.8);
        panel.insert(d(3), "AAA", 0.2);
        panel.insert(d(3), "BBB", -1.1);

        let resid = neutralise(&panel, &factor_table(&[2, 3])).unwrap();
        for (_, cs) in resid.iter() {
            let mean: f64 = cs.values().sum::<f64>() / cs.len() as f64;
            assert!(mean.abs() < 1e-8);
        }
    }

    #[test]
    fn index_is_preserved() {
        let mut panel = SignalPanel::new();
        panel.insert(d(2), "AAA", 1.0);
        panel.insert(d(2), "BBB", -1.0);

        let resid = neutralise(&panel, &factor_table(&[2])).unwrap();
        assert_eq!(resid.len(), 2);
        assert!(resid.get(d(2), "AAA").is_some());
        assert!(resid.get(d(2), "BBB").is_some());
    }

    #[test]
    fn dates_without_factors_dropped() {
        let mut panel = SignalPanel::new();
        panel.insert(d(2), "AAA", 1.0);
        panel.insert(d(2), "BBB", -1.0);
        panel.insert(d(6), "AAA", 0.5);
        panel.insert(d(6), "BBB", -0.5);

        let resid = neutralise(&panel, &factor_table(&[2])).unwrap();
        let dates: Vec<_> = resid.dates().collect();
        assert_eq!(dates, vec![d(2)]);
    }

    #[test]
    fn no_common_dates_is_an_error() {
        let mut panel = SignalPanel::new();
        panel.insert(d(2), "AAA", 1.0);

        let err = neutralise(&panel, &factor_table(&[9])).unwrap_err();
        assert_eq!(err.axis, "date");
    }

    #[test]
    fn empty_panel_propagates_as_empty() {
        let panel = SignalPanel::new();
        let resid = neutralise(&panel, &factor_table(&[2])).unwrap();
        assert!(resid.is_empty());
    }
}
