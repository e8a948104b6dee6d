//! Artifact export: Parquet + CSV tables, metrics JSON, markdown report.
//!
//! Layout under the output directory:
//! - `weights.parquet` / `weights.csv` — date × symbol weight matrix
//! - `pnl.parquet` / `pnl.csv` — realized return series
//! - `turnover.parquet` / `turnover.csv` — turnover series
//! - `factor_panel.parquet` — neutralized signal observations (long form)
//! - `metrics.json` — the scalar summary of the run
//! - `manifest.json` — run id, schema version, file list
//! - `report.md` — human-readable summary
//!
//! Parquet is the lossless float format; the CSV copies are for eyeballing.

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, ParquetWriter};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tonelab_core::domain::{DailySeries, SignalPanel, WeightMatrix};

use crate::result::BacktestRun;

/// Locations of everything [`save_run`] wrote.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub weights_parquet: PathBuf,
    pub weights_csv: PathBuf,
    pub pnl_parquet: PathBuf,
    pub pnl_csv: PathBuf,
    pub turnover_parquet: PathBuf,
    pub turnover_csv: PathBuf,
    pub factor_panel_parquet: PathBuf,
    pub metrics_json: PathBuf,
    pub manifest: PathBuf,
    pub report_markdown: PathBuf,
}

#[derive(Serialize)]
struct Manifest<'a> {
    schema_version: u32,
    run_id: &'a str,
    synthetic: bool,
    files: Vec<String>,
}

/// Write every artifact for a completed run into `output_dir`.
pub fn save_run(output_dir: impl AsRef<Path>, run: &BacktestRun) -> Result<ArtifactPaths> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir {}", dir.display()))?;

    let paths = ArtifactPaths {
        weights_parquet: dir.join("weights.parquet"),
        weights_csv: dir.join("weights.csv"),
        pnl_parquet: dir.join("pnl.parquet"),
        pnl_csv: dir.join("pnl.csv"),
        turnover_parquet: dir.join("turnover.parquet"),
        turnover_csv: dir.join("turnover.csv"),
        factor_panel_parquet: dir.join("factor_panel.parquet"),
        metrics_json: dir.join("metrics.json"),
        manifest: dir.join("manifest.json"),
        report_markdown: dir.join("report.md"),
    };

    let mut weights_df = weights_to_dataframe(&run.weights)?;
    write_parquet(&mut weights_df, &paths.weights_parquet)?;
    write_weights_csv(&paths.weights_csv, &run.weights)?;

    let mut pnl_df = series_to_dataframe("pnl", &run.pnl)?;
    write_parquet(&mut pnl_df, &paths.pnl_parquet)?;
    write_series_csv(&paths.pnl_csv, "pnl", &run.pnl)?;

    let mut turnover_df = series_to_dataframe("turnover", &run.turnover)?;
    write_parquet(&mut turnover_df, &paths.turnover_parquet)?;
    write_series_csv(&paths.turnover_csv, "turnover", &run.turnover)?;

    let mut panel_df = panel_to_dataframe(&run.neutral_panel)?;
    write_parquet(&mut panel_df, &paths.factor_panel_parquet)?;

    let metrics_json =
        serde_json::to_string_pretty(run).context("failed to serialize run summary")?;
    std::fs::write(&paths.metrics_json, metrics_json)
        .with_context(|| format!("failed to write {}", paths.metrics_json.display()))?;

    let manifest = Manifest {
        schema_version: run.schema_version,
        run_id: &run.run_id,
        synthetic: run.synthetic,
        files: [
            "weights.parquet",
            "weights.csv",
            "pnl.parquet",
            "pnl.csv",
            "turnover.parquet",
            "turnover.csv",
            "factor_panel.parquet",
            "metrics.json",
            "report.md",
        ]
        .map(String::from)
        .to_vec(),
    };
    let manifest_json =
        serde_json::to_string_pretty(&manifest).context("failed to serialize manifest")?;
    std::fs::write(&paths.manifest, manifest_json)
        .with_context(|| format!("failed to write {}", paths.manifest.display()))?;

    std::fs::write(&paths.report_markdown, render_markdown_report(run))
        .with_context(|| format!("failed to write {}", paths.report_markdown.display()))?;

    Ok(paths)
}

// ─── DataFrame builders ─────────────────────────────────────────────

fn weights_to_dataframe(weights: &WeightMatrix) -> Result<DataFrame> {
    let dates: Vec<String> = weights.dates().map(|d| d.to_string()).collect();
    let mut columns = vec![Column::new("date".into(), dates)];
    for (idx, symbol) in weights.symbols().iter().enumerate() {
        let values: Vec<f64> = weights.rows().map(|(_, row)| row[idx]).collect();
        columns.push(Column::new(symbol.as_str().into(), values));
    }
    DataFrame::new(columns).context("failed to build weights dataframe")
}

fn series_to_dataframe(name: &str, series: &DailySeries) -> Result<DataFrame> {
    let dates: Vec<String> = series.dates().map(|d| d.to_string()).collect();
    let values: Vec<f64> = series.values();
    DataFrame::new(vec![
        Column::new("date".into(), dates),
        Column::new(name.into(), values),
    ])
    .with_context(|| format!("failed to build {name} dataframe"))
}

/// Long-form (date, symbol, value) frame for the neutralized panel.
fn panel_to_dataframe(panel: &SignalPanel) -> Result<DataFrame> {
    let mut dates = Vec::with_capacity(panel.len());
    let mut symbols = Vec::with_capacity(panel.len());
    let mut values = Vec::with_capacity(panel.len());
    for (date, cross_section) in panel.iter() {
        for (symbol, value) in cross_section {
            dates.push(date.to_string());
            symbols.push(symbol.clone());
            values.push(*value);
        }
    }
    DataFrame::new(vec![
        Column::new("date".into(), dates),
        Column::new("symbol".into(), symbols),
        Column::new("tone_resid".into(), values),
    ])
    .context("failed to build factor panel dataframe")
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    ParquetWriter::new(file)
        .finish(df)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

// ─── CSV writers ────────────────────────────────────────────────────

fn write_series_csv(path: &Path, name: &str, series: &DailySeries) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(["date", name])?;
    for (date, value) in series.iter() {
        writer.write_record([date.to_string(), format!("{value}")])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_weights_csv(path: &Path, weights: &WeightMatrix) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut header = vec!["date".to_string()];
    header.extend(weights.symbols().iter().cloned());
    writer.write_record(&header)?;
    for (date, row) in weights.rows() {
        let mut record = vec![date.to_string()];
        record.extend(row.iter().map(|w| format!("{w}")));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

// ─── Markdown report ────────────────────────────────────────────────

/// Render the human-readable run summary.
pub fn render_markdown_report(run: &BacktestRun) -> String {
    let m = &run.metrics;
    let mut report = format!(
        "# ToneLab Run Report\n\n\
Run ID: `{}`\n\n\
{}## Summary\n\
- Dates: {} → {}\n\
- Signal rows: {} ({} after neutralization)\n\
- IR (annualized): {:.3}\n\
- Avg turnover: {:.4} (max {:.4})\n\
- Turnover-adjusted IR: {:.3}\n\n\
## Metrics\n\
| Metric | Value |\n\
|--------|-------|\n\
| Total return | {:+.2}% |\n\
| Annualized return | {:+.2}% |\n\
| Annualized volatility | {:.2}% |\n\
| Sharpe | {:.2} |\n\
| Sortino | {:.2} |\n\
| Calmar | {:.2} |\n\
| Max drawdown | {:+.2}% |\n\
| Win rate | {:.1}% |\n\
| Profit ratio | {:.2} |\n\
| Monthly consistency | {:.1}% |\n",
        run.run_id,
        if run.synthetic {
            "**Synthetic data** — results are for pipeline validation only.\n\n"
        } else {
            ""
        },
        run.start_date.map_or_else(|| "-".to_string(), |d| d.to_string()),
        run.end_date.map_or_else(|| "-".to_string(), |d| d.to_string()),
        run.signal_rows,
        run.neutral_rows,
        run.information_ratio,
        run.avg_turnover,
        run.max_turnover,
        run.turnover_adjusted_ir,
        m.total_return * 100.0,
        m.annualized_return * 100.0,
        m.annualized_volatility * 100.0,
        m.sharpe_ratio,
        m.sortino_ratio,
        m.calmar_ratio,
        m.max_drawdown * 100.0,
        m.win_rate * 100.0,
        m.profit_ratio,
        m.monthly_consistency * 100.0,
    );

    if let Some(conditional) = &run.conditional {
        report.push_str(&format!(
            "\n## Conditional Performance ({} split at {:.4})\n\
| Regime | Periods | Sharpe | Win rate |\n\
|--------|---------|--------|----------|\n\
| High | {} | {:.2} | {:.1}% |\n\
| Low | {} | {:.2} | {:.1}% |\n",
            run.config.report.condition_factor,
            conditional.threshold,
            conditional.high_count,
            conditional.high_regime.sharpe_ratio,
            conditional.high_regime.win_rate * 100.0,
            conditional.low_count,
            conditional.low_regime.sharpe_ratio,
            conditional.low_regime.win_rate * 100.0,
        ));
    }

    if let Some(exposures) = &run.factor_exposures {
        if let Some((last_date, betas)) = exposures.betas.iter().next_back() {
            report.push_str(&format!(
                "\n## Factor Exposures (window {}, latest {})\n\
| Factor | Beta |\n\
|--------|------|\n",
                run.config.report.rolling_window, last_date
            ));
            for (name, beta) in exposures.factor_names.iter().zip(betas) {
                report.push_str(&format!("| {name} | {beta:+.3} |\n"));
            }
            let avg_r2 = exposures.r_squared.mean();
            report.push_str(&format!("\nMean rolling R²: {avg_r2:.3}\n"));
        }
    }

    report
}
