//! End-to-end pipeline tests on synthetic data, including artifact export.

use tonelab_runner::{
    generate_synthetic_data, run_backtest_from_data, save_run, BacktestConfig, PipelineData,
};

fn synthetic_data() -> PipelineData {
    generate_synthetic_data(
        &["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG", "HHH"],
        180,
        42,
    )
    .into()
}

#[test]
fn full_pipeline_execution() {
    let config = BacktestConfig::default();
    let run = run_backtest_from_data(&config, &synthetic_data(), None).unwrap();

    assert!(run.signal_rows > 0, "signal builder produced no rows");
    assert!(run.neutral_rows > 0, "neutralizer dropped everything");
    assert!(!run.weights.is_empty(), "weight engine produced no rows");
    assert!(!run.pnl.is_empty(), "PnL engine produced no rows");
    assert!(!run.turnover.is_empty());
    assert!(run.metrics.annualized_volatility.is_finite());
    assert!(run.information_ratio.is_finite());
}

#[test]
fn weight_invariants_hold_end_to_end() {
    let mut config = BacktestConfig::default();
    config.portfolio.gross = 1.5;
    config.portfolio.smoothing = 0.75;
    let run = run_backtest_from_data(&config, &synthetic_data(), None).unwrap();

    for date in run.weights.dates() {
        let net = run.weights.net_exposure(date).unwrap();
        let gross = run.weights.gross_exposure(date).unwrap();
        assert!(net.abs() < 1e-8, "net {net} on {date}");
        if gross > 0.0 {
            assert!((gross - 1.5).abs() < 1e-6, "gross {gross} on {date}");
        }
    }

    for (date, value) in run.turnover.iter() {
        assert!(
            (0.0..=1.5 + 1e-9).contains(&value),
            "turnover {value} on {date}"
        );
    }
}

#[test]
fn smoothing_reduces_average_turnover() {
    let data = synthetic_data();

    let avg_turnover = |smoothing: f64| {
        let mut config = BacktestConfig::default();
        config.portfolio.smoothing = smoothing;
        let run = run_backtest_from_data(&config, &data, None).unwrap();
        run.avg_turnover
    };

    let unsmoothed = avg_turnover(0.0);
    for smoothing in [0.5, 0.75, 0.9] {
        let smoothed = avg_turnover(smoothing);
        assert!(
            smoothed <= unsmoothed * 1.1,
            "smoothing {smoothing} raised turnover: {smoothed} vs {unsmoothed}"
        );
    }
}

#[test]
fn artifacts_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = BacktestConfig::default();
    let run = run_backtest_from_data(&config, &synthetic_data(), None).unwrap();

    let paths = save_run(dir.path(), &run).unwrap();

    // Manifest carries the run id and lists the files next to it.
    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.manifest).unwrap()).unwrap();
    assert_eq!(manifest["run_id"].as_str().unwrap(), run.run_id);
    assert!(manifest["synthetic"].as_bool().unwrap());
    for file in manifest["files"].as_array().unwrap() {
        assert!(dir.path().join(file.as_str().unwrap()).exists());
    }

    // The CSV copy has one header line plus one line per weight date.
    let weights_csv = std::fs::read_to_string(&paths.weights_csv).unwrap();
    assert_eq!(weights_csv.lines().count(), run.weights.date_count() + 1);
}

#[test]
fn rerunning_identical_config_reproduces_the_run() {
    let config = BacktestConfig::default();
    let data = synthetic_data();
    let first = run_backtest_from_data(&config, &data, None).unwrap();
    let second = run_backtest_from_data(&config, &data, None).unwrap();

    assert_eq!(first.run_id, second.run_id);
    assert_eq!(first.weights, second.weights);
    assert_eq!(first.pnl, second.pnl);
    assert_eq!(first.metrics, second.metrics);
}
