//! Criterion benchmarks for the weight-engine hot paths.
//!
//! Benchmarks:
//! 1. Step A target computation (parallel across dates)
//! 2. Step B smoothing scan (sequential by construction)
//! 3. The combined engine

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tonelab_core::domain::SignalPanel;
use tonelab_core::portfolio::{build_weights, smooth_weights, target_weights, PortfolioConfig};

fn make_panel(days: usize, assets: usize) -> SignalPanel {
    let mut rng = StdRng::seed_from_u64(17);
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut panel = SignalPanel::new();
    for day in 0..days {
        let date = base + chrono::Duration::days(day as i64);
        for asset in 0..assets {
            panel.insert(date, format!("S{asset:04}"), rng.gen_range(-3.0..3.0));
        }
    }
    panel
}

fn bench_target_weights(c: &mut Criterion) {
    let config = PortfolioConfig::default();
    let mut group = c.benchmark_group("target_weights");
    for assets in [50, 200, 500] {
        let panel = make_panel(252, assets);
        group.bench_with_input(BenchmarkId::from_parameter(assets), &panel, |b, panel| {
            b.iter(|| target_weights(panel, &config));
        });
    }
    group.finish();
}

fn bench_smoothing_scan(c: &mut Criterion) {
    let config = PortfolioConfig::default();
    let panel = make_panel(252, 200);
    let targets = target_weights(&panel, &config);
    c.bench_function("smooth_weights_252x200", |b| {
        b.iter(|| smooth_weights(&targets, &config));
    });
}

fn bench_full_engine(c: &mut Criterion) {
    let config = PortfolioConfig::default();
    let panel = make_panel(252, 200);
    c.bench_function("build_weights_252x200", |b| {
        b.iter(|| build_weights(&panel, &config).unwrap());
    });
}

criterion_group!(
    benches,
    bench_target_weights,
    bench_smoothing_scan,
    bench_full_engine
);
criterion_main!(benches);
