//! Sparse (date, symbol) signal panel.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A sparse cross-sectional panel: one symbol → value map per date.
///
/// The asset set may differ between dates. Within a date each symbol appears
/// at most once; inserting an existing key overwrites it, so duplicate
/// (date, symbol) entries cannot exist by construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalPanel {
    days: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
}

impl SignalPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one observation, overwriting any existing entry for the key.
    pub fn insert(&mut self, date: NaiveDate, symbol: impl Into<String>, value: f64) {
        self.days.entry(date).or_default().insert(symbol.into(), value);
    }

    pub fn get(&self, date: NaiveDate, symbol: &str) -> Option<f64> {
        self.days.get(&date).and_then(|cs| cs.get(symbol)).copied()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// The cross-section for one date, symbols in sorted order.
    pub fn cross_section(&self, date: NaiveDate) -> Option<&BTreeMap<String, f64>> {
        self.days.get(&date)
    }

    /// Iterate (date, cross-section) in date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &BTreeMap<String, f64>)> {
        self.days.iter().map(|(d, cs)| (*d, cs))
    }

    /// Every symbol observed anywhere in the panel, sorted and deduplicated.
    pub fn symbols(&self) -> Vec<String> {
        let set: std::collections::BTreeSet<&str> = self
            .days
            .values()
            .flat_map(|cs| cs.keys().map(String::as_str))
            .collect();
        set.into_iter().map(String::from).collect()
    }

    /// Number of dates with at least one observation.
    pub fn date_count(&self) -> usize {
        self.days.len()
    }

    /// Total number of (date, symbol) observations.
    pub fn len(&self) -> usize {
        self.days.values().map(|cs| cs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl FromIterator<(NaiveDate, String, f64)> for SignalPanel {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, String, f64)>>(iter: I) -> Self {
        let mut panel = Self::new();
        for (date, symbol, value) in iter {
            panel.insert(date, symbol, value);
        }
        panel
    }
}
