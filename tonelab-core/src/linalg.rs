//! Least-squares helpers shared by the neutralizer and rolling exposures.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Solve min ‖Xβ − y‖² through the normal equations.
///
/// Elimination is pivoted column by column; a pivot that collapses below a
/// scaled tolerance marks the column as linearly dependent on the ones
/// already processed and its coefficient is fixed at zero. Rank-deficient
/// designs (e.g. an intercept next to constant regressors) therefore still
/// yield a valid least-squares fit instead of NaN.
///
/// Columns are eliminated in order, so place the intercept first to let it
/// absorb the fit when later regressors are redundant.
pub fn lstsq(x: ArrayView2<f64>, y: ArrayView1<f64>) -> Array1<f64> {
    let k = x.ncols();
    let a = x.t().dot(&x);
    let b = x.t().dot(&y);
    solve_normal_equations(a, b, k)
}

/// Regression residuals y − X·β with β from [`lstsq`].
pub fn residuals(x: ArrayView2<f64>, y: ArrayView1<f64>) -> Array1<f64> {
    let beta = lstsq(x, y);
    y.to_owned() - x.dot(&beta)
}

/// Coefficient of determination 1 − SSR/SST.
///
/// Returns 0.0 when the dependent variable has no variance.
pub fn r_squared(y: ArrayView1<f64>, resid: ArrayView1<f64>) -> f64 {
    let n = y.len();
    if n == 0 {
        return 0.0;
    }
    let mean = y.sum() / n as f64;
    let sst: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    if sst < 1e-15 {
        return 0.0;
    }
    let ssr: f64 = resid.iter().map(|r| r * r).sum();
    1.0 - ssr / sst
}

fn solve_normal_equations(mut a: Array2<f64>, mut b: Array1<f64>, k: usize) -> Array1<f64> {
    // Scale-aware tolerance for declaring a pivot dead.
    let scale = a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())).max(1.0);
    let tol = 1e-10 * scale;

    // Row-echelon elimination with partial pivoting; columns whose pivot
    // vanishes are skipped and their coefficient stays zero.
    let mut pivot_row_of_col: Vec<Option<usize>> = vec![None; k];
    let mut next_pivot_row = 0;

    for col in 0..k {
        let mut best = next_pivot_row;
        for row in next_pivot_row..k {
            if a[[row, col]].abs() > a[[best, col]].abs() {
                best = row;
            }
        }
        if a[[best, col]].abs() < tol {
            continue;
        }
        if best != next_pivot_row {
            for j in 0..k {
                a.swap([best, j], [next_pivot_row, j]);
            }
            b.swap(best, next_pivot_row);
        }
        pivot_row_of_col[col] = Some(next_pivot_row);

        for row in next_pivot_row + 1..k {
            let factor = a[[row, col]] / a[[next_pivot_row, col]];
            if factor != 0.0 {
                for j in col..k {
                    let delta = factor * a[[next_pivot_row, j]];
                    a[[row, j]] -= delta;
                }
                b[row] -= factor * b[next_pivot_row];
            }
        }
        next_pivot_row += 1;
        if next_pivot_row == k {
            break;
        }
    }

    let mut beta = Array1::zeros(k);
    for col in (0..k).rev() {
        if let Some(pr) = pivot_row_of_col[col] {
            let mut sum = b[pr];
            for j in col + 1..k {
                sum -= a[[pr, j]] * beta[j];
            }
            beta[col] = sum / a[[pr, col]];
        }
    }
    beta
}
