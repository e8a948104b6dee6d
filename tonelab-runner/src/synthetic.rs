//! Seeded synthetic inputs for smoke runs and demos.
//!
//! Everything is generated from a single seed so repeated runs produce
//! identical panels, prices, and factors. Synthetic provenance is recorded
//! on the run result; these inputs exist to exercise the pipeline, not to
//! say anything about markets.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tonelab_core::domain::{FactorTable, PriceTable};
use tonelab_core::factor::{next_business_day, CallObservation};

/// The three synthetic input tables.
#[derive(Debug, Clone)]
pub struct SyntheticData {
    pub calls: Vec<CallObservation>,
    pub prices: PriceTable,
    pub factors: FactorTable,
}

/// Generate aligned synthetic calls, prices, and factor returns.
///
/// Prices follow independent random walks over `days` consecutive business
/// days; every symbol reports a call roughly once a week with a standard-
/// normal-ish tone-dispersion score; factors are small daily returns with
/// the usual Fama-French column names.
pub fn generate_synthetic_data(symbols: &[&str], days: usize, seed: u64) -> SyntheticData {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date");

    let mut dates = Vec::with_capacity(days);
    let mut current = start;
    for _ in 0..days {
        dates.push(current);
        current = next_business_day(current);
    }

    // Prices: one random walk per symbol.
    let mut sorted_symbols: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
    sorted_symbols.sort();
    let mut levels: Vec<f64> = (0..sorted_symbols.len())
        .map(|_| rng.gen_range(20.0..200.0))
        .collect();
    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for date in &dates {
        for level in levels.iter_mut() {
            *level *= 1.0 + rng.gen_range(-0.02..0.02);
        }
        rows.insert(*date, levels.iter().map(|l| Some(*l)).collect());
    }
    let prices = PriceTable::from_rows(sorted_symbols.clone(), rows);

    // Calls: each symbol reports on ~20% of days; the call lands on the day
    // itself and the signal builder maps it to the next business day.
    let mut calls = Vec::new();
    for date in &dates {
        for symbol in &sorted_symbols {
            if rng.gen_range(0.0..1.0) < 0.2 {
                calls.push(CallObservation {
                    call_date: *date,
                    symbol: symbol.clone(),
                    tone_dispersion: pseudo_normal(&mut rng),
                });
            }
        }
    }

    // Factors: small daily returns, FF-5 plus momentum.
    let names = ["mktrf", "smb", "hml", "rmw", "cma", "umd"]
        .map(String::from)
        .to_vec();
    let mut factors = FactorTable::new(names.clone());
    // Factor rows must also cover call trade dates past the price axis end.
    let mut factor_dates = dates.clone();
    if let Some(last) = dates.last() {
        factor_dates.push(next_business_day(*last));
    }
    for date in &factor_dates {
        let row: Vec<f64> = (0..names.len())
            .map(|_| rng.gen_range(-0.015..0.015))
            .collect();
        factors.insert(*date, row);
    }

    SyntheticData {
        calls,
        prices,
        factors,
    }
}

/// Sum of uniforms, centred: close enough to a standard normal for tests.
fn pseudo_normal(rng: &mut StdRng) -> f64 {
    (0..12).map(|_| rng.gen_range(0.0..1.0)).sum::<f64>() - 6.0
}
