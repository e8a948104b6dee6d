//! Daily risk-factor return table.

use crate::domain::DailySeries;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Factor returns keyed by date, with a fixed named column order.
///
/// One row per date, one value per factor; the same row is shared by every
/// asset on that date when used as regressors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorTable {
    names: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<f64>>,
}

impl FactorTable {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            rows: BTreeMap::new(),
        }
    }

    /// Insert one row of factor returns; length must match the column set.
    pub fn insert(&mut self, date: NaiveDate, row: Vec<f64>) {
        assert_eq!(
            row.len(),
            self.names.len(),
            "factor row length must match the column set"
        );
        self.rows.insert(date, row);
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn row(&self, date: NaiveDate) -> Option<&[f64]> {
        self.rows.get(&date).map(Vec::as_slice)
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.rows.contains_key(&date)
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    /// Extract one named column as a daily series.
    pub fn column(&self, name: &str) -> Option<DailySeries> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(self.rows.iter().map(|(d, row)| (*d, row[idx])).collect())
    }

    /// Restrict to a subset of named columns, preserving the given order.
    /// Unknown names are skipped.
    pub fn select(&self, names: &[String]) -> FactorTable {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|n| self.names.iter().position(|have| have == n))
            .collect();
        let selected_names: Vec<String> =
            indices.iter().map(|&i| self.names[i].clone()).collect();
        let mut out = FactorTable::new(selected_names);
        for (date, row) in &self.rows {
            out.insert(*date, indices.iter().map(|&i| row[i]).collect());
        }
        out
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
