//! Tone-dispersion signal construction.
//!
//! Turns raw earnings-call observations into a daily cross-sectional panel:
//! 1. Map each call to the next business day (positions can only be taken
//!    after the call has happened).
//! 2. Aggregate multiple calls per (trade date, symbol) by mean.
//! 3. Z-score each date's cross-section so scores are comparable across
//!    dates with different dispersion regimes.

use crate::domain::SignalPanel;
use crate::stats;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeMap;

/// One earnings call with its tone-dispersion score.
#[derive(Debug, Clone, PartialEq)]
pub struct CallObservation {
    /// Calendar date the call took place.
    pub call_date: NaiveDate,
    pub symbol: String,
    pub tone_dispersion: f64,
}

/// Next business day strictly after `date`.
///
/// Weekend-skipping only; exchange holiday calendars are out of scope, so a
/// call on a holiday eve maps to the next weekday even if the market is
/// closed.
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    let mut next = date + Duration::days(1);
    while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
        next += Duration::days(1);
    }
    next
}

/// Build the z-scored tone-dispersion panel from raw call observations.
///
/// Cross-sections use the population (n-denominator) standard deviation;
/// dates whose cross-section has zero dispersion (including single-asset
/// dates) cannot be z-scored and are dropped rather than emitted as NaN.
/// Empty input yields an empty panel.
pub fn build_signal_panel(calls: &[CallObservation]) -> SignalPanel {
    // (trade date, symbol) → all scores observed for that key
    let mut grouped: BTreeMap<NaiveDate, BTreeMap<&str, Vec<f64>>> = BTreeMap::new();
    for call in calls {
        if !call.tone_dispersion.is_finite() {
            continue;
        }
        let trade_date = next_business_day(call.call_date);
        grouped
            .entry(trade_date)
            .or_default()
            .entry(call.symbol.as_str())
            .or_default()
            .push(call.tone_dispersion);
    }

    let mut panel = SignalPanel::new();
    for (date, by_symbol) in grouped {
        let values: Vec<(&str, f64)> = by_symbol
            .into_iter()
            .map(|(sym, scores)| (sym, stats::mean(&scores)))
            .collect();

        let raw: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
        let mean = stats::mean(&raw);
        let std = stats::std_dev_population(&raw);
        if std <= 0.0 {
            continue;
        }
        for (sym, v) in values {
            panel.insert(date, sym, (v - mean) / std);
        }
    }
    panel
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(date: NaiveDate, symbol: &str, score: f64) -> CallObservation {
        CallObservation {
            call_date: date,
            symbol: symbol.to_string(),
            tone_dispersion: score,
        }
    }

    #[test]
    fn friday_call_trades_monday() {
        let friday = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(next_business_day(friday), monday);
    }

    #[test]
    fn midweek_call_trades_next_day() {
        let tuesday = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        assert_eq!(next_business_day(tuesday), wednesday);
    }

    #[test]
    fn saturday_call_trades_monday() {
        let saturday = NaiveDate::from_ymd_opt(2025, 1, 4).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(next_business_day(saturday), monday);
    }

    #[test]
    fn cross_section_is_zero_mean() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let calls = vec![
            call(d, "AAA", 0.3),
            call(d, "BBB", 0.9),
            call(d, "CCC", 0.1),
        ];
        let panel = build_signal_panel(&calls);
        let trade = next_business_day(d);
        let cs = panel.cross_section(trade).unwrap();
        let sum: f64 = cs.values().sum();
        assert!(sum.abs() < 1e-10);
        assert_eq!(cs.len(), 3);
    }

    #[test]
    fn duplicate_calls_average_before_scoring() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let calls = vec![
            call(d, "AAA", 0.0),
            call(d, "AAA", 1.0),
            call(d, "BBB", 0.0),
        ];
        let panel = build_signal_panel(&calls);
        let trade = next_business_day(d);
        // AAA aggregates to 0.5, BBB stays 0.0; z-scores are ±1
        assert!((panel.get(trade, "AAA").unwrap() - 1.0).abs() < 1e-10);
        assert!((panel.get(trade, "BBB").unwrap() + 1.0).abs() < 1e-10);
    }

    #[test]
    fn zero_dispersion_date_dropped() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let calls = vec![call(d, "AAA", 0.5), call(d, "BBB", 0.5)];
        let panel = build_signal_panel(&calls);
        assert!(panel.is_empty());
    }

    #[test]
    fn single_asset_date_dropped() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let panel = build_signal_panel(&[call(d, "AAA", 0.5)]);
        assert!(panel.is_empty());
    }

    #[test]
    fn non_finite_scores_skipped() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let calls = vec![
            call(d, "AAA", f64::NAN),
            call(d, "BBB", 0.1),
            call(d, "CCC", 0.9),
        ];
        let panel = build_signal_panel(&calls);
        let trade = next_business_day(d);
        assert_eq!(panel.cross_section(trade).unwrap().len(), 2);
    }

    #[test]
    fn empty_input_gives_empty_panel() {
        assert!(build_signal_panel(&[]).is_empty());
    }
}
