//! Dense date × symbol weight matrix.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Portfolio weights on a fixed, sorted symbol axis.
///
/// Rows are dense: symbols absent from a date's cross-section carry weight
/// zero rather than being missing. For every non-degenerate row the engine
/// guarantees Σw = 0 and Σ|w| = gross to numerical tolerance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightMatrix {
    symbols: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<f64>>,
}

impl WeightMatrix {
    /// Create an empty matrix with the given column axis (sorted, deduplicated).
    pub fn new(mut symbols: Vec<String>) -> Self {
        symbols.sort();
        symbols.dedup();
        Self {
            symbols,
            rows: BTreeMap::new(),
        }
    }

    /// Insert one dense row. The row length must match the symbol axis.
    pub fn push_row(&mut self, date: NaiveDate, row: Vec<f64>) {
        assert_eq!(
            row.len(),
            self.symbols.len(),
            "weight row length must match the symbol axis"
        );
        self.rows.insert(date, row);
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Column index of a symbol on the axis, if present.
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.binary_search_by(|s| s.as_str().cmp(symbol)).ok()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn row(&self, date: NaiveDate) -> Option<&[f64]> {
        self.rows.get(&date).map(Vec::as_slice)
    }

    /// Iterate (date, row) in date order.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &[f64])> {
        self.rows.iter().map(|(d, r)| (*d, r.as_slice()))
    }

    pub fn get(&self, date: NaiveDate, symbol: &str) -> Option<f64> {
        let idx = self.symbol_index(symbol)?;
        self.rows.get(&date).map(|row| row[idx])
    }

    /// Signed exposure Σw for one date.
    pub fn net_exposure(&self, date: NaiveDate) -> Option<f64> {
        self.rows.get(&date).map(|row| row.iter().sum())
    }

    /// Absolute exposure Σ|w| for one date.
    pub fn gross_exposure(&self, date: NaiveDate) -> Option<f64> {
        self.rows.get(&date).map(|row| row.iter().map(|w| w.abs()).sum())
    }

    pub fn date_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn axis_is_sorted_and_deduplicated() {
        let m = WeightMatrix::new(vec!["BBB".into(), "AAA".into(), "BBB".into()]);
        assert_eq!(m.symbols(), &["AAA".to_string(), "BBB".to_string()]);
    }

    #[test]
    fn exposures() {
        let mut m = WeightMatrix::new(vec!["AAA".into(), "BBB".into()]);
        m.push_row(d(2), vec![0.5, -0.5]);
        assert!((m.net_exposure(d(2)).unwrap()).abs() < 1e-12);
        assert!((m.gross_exposure(d(2)).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn get_by_symbol() {
        let mut m = WeightMatrix::new(vec!["AAA".into(), "BBB".into()]);
        m.push_row(d(2), vec![0.5, -0.5]);
        assert_eq!(m.get(d(2), "BBB"), Some(-0.5));
        assert_eq!(m.get(d(2), "CCC"), None);
        assert_eq!(m.get(d(3), "AAA"), None);
    }

    #[test]
    #[should_panic(expected = "weight row length")]
    fn mismatched_row_panics() {
        let mut m = WeightMatrix::new(vec!["AAA".into(), "BBB".into()]);
        m.push_row(d(2), vec![1.0]);
    }
}
