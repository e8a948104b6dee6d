//! Parquet loading for the three input tables.
//!
//! All three readers share the same conventions:
//! - Git LFS pointer files are detected up front and reported with a fix,
//!   instead of surfacing as an opaque Parquet parse error.
//! - Rows with null dates or values are dropped early.
//! - Date columns may arrive as Date, Datetime, or ISO strings.

use chrono::{DateTime, NaiveDate};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tonelab_core::domain::{FactorTable, PriceTable};
use tonelab_core::factor::CallObservation;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(
        "{path} is a Git LFS pointer, not real data; run `git lfs install` and `git lfs pull`"
    )]
    LfsPointer { path: PathBuf },
    #[error("{path} is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },
    #[error("unsupported dtype {dtype} for column '{column}' in {path}")]
    BadColumnType {
        path: PathBuf,
        column: String,
        dtype: String,
    },
    #[error("failed to read {path}: {source}")]
    Parquet {
        path: PathBuf,
        source: PolarsError,
    },
}

/// Load earnings-call observations (date/trade_date, symbol, tone_dispersion).
pub fn load_calls(path: &Path) -> Result<Vec<CallObservation>, LoadError> {
    let df = read_parquet(path)?;
    let dates = date_column(&df, path, &["date", "trade_date"])?;
    let symbols = string_column(&df, path, "symbol")?;
    let scores = float_column(&df, path, "tone_dispersion")?;

    let mut calls = Vec::with_capacity(df.height());
    for ((date, symbol), score) in dates.into_iter().zip(symbols).zip(scores) {
        let (Some(call_date), Some(symbol), Some(tone_dispersion)) = (date, symbol, score)
        else {
            continue;
        };
        calls.push(CallObservation {
            call_date,
            symbol: symbol.to_uppercase(),
            tone_dispersion,
        });
    }
    Ok(calls)
}

/// Load the long-form price table (date, symbol, adjClose) and pivot it to
/// a wide date × symbol table. Symbols are upper-cased; missing (date,
/// symbol) pairs stay explicit gaps.
pub fn load_prices(path: &Path) -> Result<PriceTable, LoadError> {
    let df = read_parquet(path)?;
    let dates = date_column(&df, path, &["date"])?;
    let symbols = string_column(&df, path, "symbol")?;
    let closes = float_column(&df, path, "adjClose")?;

    let mut universe: Vec<String> = Vec::new();
    let mut observations: Vec<(NaiveDate, String, f64)> = Vec::new();
    for ((date, symbol), close) in dates.into_iter().zip(symbols).zip(closes) {
        let (Some(date), Some(symbol), Some(close)) = (date, symbol, close) else {
            continue;
        };
        let symbol = symbol.to_uppercase();
        if !universe.contains(&symbol) {
            universe.push(symbol.clone());
        }
        observations.push((date, symbol, close));
    }
    universe.sort();

    let column: BTreeMap<&str, usize> = universe
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();
    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for (date, symbol, close) in &observations {
        let row = rows
            .entry(*date)
            .or_insert_with(|| vec![None; universe.len()]);
        row[column[symbol.as_str()]] = Some(*close);
    }
    Ok(PriceTable::from_rows(universe, rows))
}

/// Load the daily factor-return table, keeping only the named columns.
pub fn load_factors(path: &Path, columns: &[String]) -> Result<FactorTable, LoadError> {
    let df = read_parquet(path)?;
    let dates = date_column(&df, path, &["date", "trade_date"])?;

    let mut factor_values: Vec<Vec<Option<f64>>> = Vec::with_capacity(columns.len());
    for name in columns {
        factor_values.push(float_column(&df, path, name)?);
    }

    let mut table = FactorTable::new(columns.to_vec());
    'rows: for (i, date) in dates.into_iter().enumerate() {
        let Some(date) = date else { continue };
        let mut row = Vec::with_capacity(columns.len());
        for values in &factor_values {
            match values[i] {
                Some(v) => row.push(v),
                None => continue 'rows,
            }
        }
        table.insert(date, row);
    }
    Ok(table)
}

// ─── Column helpers ─────────────────────────────────────────────────

fn read_parquet(path: &Path) -> Result<DataFrame, LoadError> {
    check_not_lfs_pointer(path)?;
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ParquetReader::new(file)
        .finish()
        .map_err(|source| LoadError::Parquet {
            path: path.to_path_buf(),
            source,
        })
}

/// Detect a Git LFS pointer file before handing it to the Parquet reader.
fn check_not_lfs_pointer(path: &Path) -> Result<(), LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut first_line = String::new();
    let mut reader = BufReader::new(file);
    // A binary Parquet header is not valid UTF-8; read errors mean "not LFS".
    if reader.read_line(&mut first_line).is_ok()
        && first_line.starts_with("version https://git-lfs.github.com")
    {
        return Err(LoadError::LfsPointer {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Extract a date column, accepting the first present candidate name and
/// Date/Datetime/String representations.
fn date_column(
    df: &DataFrame,
    path: &Path,
    candidates: &[&str],
) -> Result<Vec<Option<NaiveDate>>, LoadError> {
    let column = candidates
        .iter()
        .find_map(|name| df.column(name).ok())
        .ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: candidates.join("' or '"),
        })?;

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch");
    match column.dtype() {
        DataType::Date => {
            let ca = column.date().map_err(|source| LoadError::Parquet {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(ca
                .into_iter()
                .map(|days| days.map(|d| epoch + chrono::Duration::days(d as i64)))
                .collect())
        }
        DataType::Datetime(unit, _) => {
            let ca = column.datetime().map_err(|source| LoadError::Parquet {
                path: path.to_path_buf(),
                source,
            })?;
            let to_millis = |ts: i64| match unit {
                TimeUnit::Milliseconds => ts,
                TimeUnit::Microseconds => ts / 1_000,
                TimeUnit::Nanoseconds => ts / 1_000_000,
            };
            Ok(ca
                .into_iter()
                .map(|ts| {
                    ts.and_then(|t| DateTime::from_timestamp_millis(to_millis(t)))
                        .map(|dt| dt.date_naive())
                })
                .collect())
        }
        DataType::String => {
            let ca = column.str().map_err(|source| LoadError::Parquet {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(ca
                .into_iter()
                .map(|s| s.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
                .collect())
        }
        other => Err(LoadError::BadColumnType {
            path: path.to_path_buf(),
            column: column.name().to_string(),
            dtype: format!("{other:?}"),
        }),
    }
}

fn string_column(
    df: &DataFrame,
    path: &Path,
    name: &str,
) -> Result<Vec<Option<String>>, LoadError> {
    let column = df.column(name).map_err(|_| LoadError::MissingColumn {
        path: path.to_path_buf(),
        column: name.to_string(),
    })?;
    let ca = column.str().map_err(|source| LoadError::Parquet {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ca.into_iter().map(|s| s.map(String::from)).collect())
}

fn float_column(df: &DataFrame, path: &Path, name: &str) -> Result<Vec<Option<f64>>, LoadError> {
    let column = df.column(name).map_err(|_| LoadError::MissingColumn {
        path: path.to_path_buf(),
        column: name.to_string(),
    })?;
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|source| LoadError::Parquet {
            path: path.to_path_buf(),
            source,
        })?;
    let ca = casted.f64().map_err(|source| LoadError::Parquet {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ca.into_iter().collect())
}
