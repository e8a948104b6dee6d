//! Dense date × symbol price table with explicit gaps.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Adjusted-close prices on a fixed symbol axis.
///
/// Missing entries are `None`, never zero: a gap means "no price observed",
/// and downstream forward-return math must skip it rather than treat it as
/// a 100% loss. Rows are stored positionally so horizon arithmetic can walk
/// the date axis by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Build from per-date rows. The symbol axis is sorted and deduplicated;
    /// each row must already be aligned to it.
    pub fn from_rows(symbols: Vec<String>, rows: BTreeMap<NaiveDate, Vec<Option<f64>>>) -> Self {
        let mut dates = Vec::with_capacity(rows.len());
        let mut data = Vec::with_capacity(rows.len());
        for (date, row) in rows {
            assert_eq!(
                row.len(),
                symbols.len(),
                "price row length must match the symbol axis"
            );
            dates.push(date);
            data.push(row);
        }
        Self {
            symbols,
            dates,
            rows: data,
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Position of a date on the axis, if present.
    pub fn date_position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Row by position on the date axis.
    pub fn row_at(&self, pos: usize) -> Option<&[Option<f64>]> {
        self.rows.get(pos).map(Vec::as_slice)
    }

    pub fn get(&self, date: NaiveDate, symbol: &str) -> Option<f64> {
        let row = self.date_position(date)?;
        let col = self.symbol_index(symbol)?;
        self.rows[row][col]
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn table() -> PriceTable {
        let symbols = vec!["AAA".to_string(), "BBB".to_string()];
        let mut rows = BTreeMap::new();
        rows.insert(d(2), vec![Some(100.0), Some(50.0)]);
        rows.insert(d(3), vec![Some(101.0), None]);
        PriceTable::from_rows(symbols, rows)
    }

    #[test]
    fn gaps_are_none_not_zero() {
        let t = table();
        assert_eq!(t.get(d(3), "BBB"), None);
        assert_eq!(t.get(d(3), "AAA"), Some(101.0));
    }

    #[test]
    fn positional_access() {
        let t = table();
        assert_eq!(t.date_position(d(3)), Some(1));
        assert_eq!(t.row_at(0).unwrap()[1], Some(50.0));
        assert_eq!(t.date_position(d(9)), None);
    }
}
