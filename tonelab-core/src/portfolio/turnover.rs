//! Realized turnover accounting.

use crate::domain::{DailySeries, WeightMatrix};

/// Turnover per rebalance: ½·Σ|w(t) − w(t−1)|.
///
/// 1.0 means full portfolio replacement at unit gross, 0 means unchanged.
/// The first date has no predecessor and is dropped rather than reported as
/// zero, which would fake a calm start.
pub fn turnover(weights: &WeightMatrix) -> DailySeries {
    let mut series = DailySeries::new();
    let mut prev: Option<&[f64]> = None;

    for (date, row) in weights.rows() {
        if let Some(prev_row) = prev {
            let traded: f64 = row
                .iter()
                .zip(prev_row)
                .map(|(w, p)| (w - p).abs())
                .sum();
            series.insert(date, 0.5 * traded);
        }
        prev = Some(row);
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn matrix(rows: &[(u32, [f64; 2])]) -> WeightMatrix {
        let mut m = WeightMatrix::new(vec!["AAA".into(), "BBB".into()]);
        for (day, row) in rows {
            m.push_row(d(*day), row.to_vec());
        }
        m
    }

    #[test]
    fn identical_rows_have_zero_turnover() {
        let m = matrix(&[(2, [0.5, -0.5]), (3, [0.5, -0.5])]);
        let t = turnover(&m);
        assert_eq!(t.get(d(3)), Some(0.0));
    }

    #[test]
    fn full_flip_is_full_replacement() {
        let m = matrix(&[(2, [0.5, -0.5]), (3, [-0.5, 0.5])]);
        let t = turnover(&m);
        assert!((t.get(d(3)).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn first_date_is_dropped() {
        let m = matrix(&[(2, [0.5, -0.5]), (3, [0.4, -0.4])]);
        let t = turnover(&m);
        assert_eq!(t.get(d(2)), None);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn partial_rebalance() {
        let m = matrix(&[(2, [0.5, -0.5]), (3, [0.3, -0.3])]);
        let t = turnover(&m);
        // ½ (|0.3-0.5| + |-0.3+0.5|) = 0.2
        assert!((t.get(d(3)).unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn empty_and_single_row_give_empty_series() {
        assert!(turnover(&matrix(&[])).is_empty());
        assert!(turnover(&matrix(&[(2, [0.5, -0.5])])).is_empty());
    }
}
