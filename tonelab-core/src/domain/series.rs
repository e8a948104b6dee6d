//! Date-keyed scalar series (turnover, PnL, conditioning series).

use crate::stats;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ordered date → value series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailySeries {
    points: BTreeMap<NaiveDate, f64>,
}

impl DailySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, value: f64) {
        self.points.insert(date, value);
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points.get(&date).copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.points.contains_key(&date)
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.keys().copied()
    }

    /// Values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    /// Iterate (date, value) in date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }

    /// Keep only the dates also present in `other`.
    pub fn intersect(&self, other: &DailySeries) -> DailySeries {
        self.iter().filter(|(d, _)| other.contains(*d)).collect()
    }

    /// Arithmetic mean of the values, 0.0 when empty.
    pub fn mean(&self) -> f64 {
        stats::mean(&self.values())
    }

    /// Sample standard deviation of the values, 0.0 below 2 points.
    pub fn std_dev(&self) -> f64 {
        stats::std_dev(&self.values())
    }

    /// Largest value, 0.0 when empty.
    pub fn max(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.values().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<(NaiveDate, f64)> for DailySeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (date, value) in iter {
            series.insert(date, value);
        }
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn ordered_iteration() {
        let s: DailySeries = [(d(6), 2.0), (d(2), 1.0)].into_iter().collect();
        let dates: Vec<_> = s.dates().collect();
        assert_eq!(dates, vec![d(2), d(6)]);
        assert_eq!(s.values(), vec![1.0, 2.0]);
    }

    #[test]
    fn intersect_keeps_common_dates() {
        let a: DailySeries = [(d(2), 1.0), (d(3), 2.0), (d(6), 3.0)].into_iter().collect();
        let b: DailySeries = [(d(3), 0.0), (d(6), 0.0)].into_iter().collect();
        let c = a.intersect(&b);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(d(3)), Some(2.0));
        assert_eq!(c.get(d(2)), None);
    }

    #[test]
    fn summary_statistics() {
        let s: DailySeries = [(d(2), 1.0), (d(3), 3.0)].into_iter().collect();
        assert!((s.mean() - 2.0).abs() < 1e-12);
        assert!((s.max() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_series_statistics_are_zero() {
        let s = DailySeries::new();
        assert_eq!(s.mean(), 0.0);
        assert_eq!(s.std_dev(), 0.0);
        assert_eq!(s.max(), 0.0);
    }
}
