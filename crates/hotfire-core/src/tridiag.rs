//! Tridiagonal solves for the spline moment equations.

use crate::error::{CoreError, CoreResult};

/// Solve the banded system whose row `i` reads
/// `sub[i]·x[i-1] + diag[i]·x[i] + sup[i]·x[i+1] = rhs[i]`.
///
/// `sub[0]` and `sup[n-1]` fall outside the matrix and are ignored. No
/// pivoting: a zero pivot during elimination is reported as singular.
pub fn solve_tridiagonal(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    rhs: &[f64],
) -> CoreResult<Vec<f64>> {
    let n = rhs.len();
    if let Some(len) = [sub.len(), diag.len(), sup.len()].into_iter().find(|&l| l != n) {
        return Err(CoreError::LengthMismatch { x_len: len, y_len: n });
    }

    // Eliminate the sub-diagonal, keeping the reduced super-diagonal and rhs
    let mut upper = Vec::with_capacity(n);
    let mut reduced = Vec::with_capacity(n);
    for i in 0..n {
        let (prev_upper, prev_rhs) = if i == 0 {
            (0.0, 0.0)
        } else {
            (upper[i - 1], reduced[i - 1])
        };
        let pivot = diag[i] - sub[i] * prev_upper;
        if pivot == 0.0 {
            return Err(CoreError::SingularSystem(i));
        }
        upper.push(if i + 1 < n { sup[i] / pivot } else { 0.0 });
        reduced.push((rhs[i] - sub[i] * prev_rhs) / pivot);
    }

    let mut x = reduced;
    for i in (0..n.saturating_sub(1)).rev() {
        x[i] -= upper[i] * x[i + 1];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residual(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64], x: &[f64]) -> f64 {
        let n = x.len();
        (0..n)
            .map(|i| {
                let mut row = diag[i] * x[i];
                if i > 0 {
                    row += sub[i] * x[i - 1];
                }
                if i + 1 < n {
                    row += sup[i] * x[i + 1];
                }
                (row - rhs[i]).abs()
            })
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_clamped_moments_uniform_grid() {
        // y = x^3 on knots 0..=4 with end slopes 0 and 48: moments are 6x
        let h = 1.0;
        let sub = [0.0, h, h, h, h];
        let diag = [2.0 * h, 4.0 * h, 4.0 * h, 4.0 * h, 2.0 * h];
        let sup = [h, h, h, h, 0.0];
        let y: [f64; 5] = [0.0, 1.0, 8.0, 27.0, 64.0];
        let slope: Vec<f64> = y.windows(2).map(|w| (w[1] - w[0]) / h).collect();
        let mut rhs = vec![6.0 * (slope[0] - 0.0)];
        rhs.extend(slope.windows(2).map(|s| 6.0 * (s[1] - s[0])));
        rhs.push(6.0 * (48.0 - slope[3]));

        let m = solve_tridiagonal(&sub, &diag, &sup, &rhs).unwrap();
        for (i, mi) in m.iter().enumerate() {
            assert!((mi - 6.0 * i as f64).abs() < 1e-12, "m = {m:?}");
        }
    }

    #[test]
    fn test_clamped_moments_uneven_grid() {
        let x = [0.0, 0.2, 0.9, 1.0, 2.5, 3.1];
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let n = x.len();
        let mut sub = vec![0.0; n];
        let mut diag = vec![2.0 * h[0]; n];
        let mut sup = vec![0.0; n];
        sup[0] = h[0];
        for i in 1..n - 1 {
            sub[i] = h[i - 1];
            diag[i] = 2.0 * (h[i - 1] + h[i]);
            sup[i] = h[i];
        }
        sub[n - 1] = h[n - 2];
        diag[n - 1] = 2.0 * h[n - 2];
        let rhs = [3.0, -1.0, 0.5, 4.0, -2.0, 1.0];

        let m = solve_tridiagonal(&sub, &diag, &sup, &rhs).unwrap();
        assert!(residual(&sub, &diag, &sup, &rhs, &m) < 1e-12);
    }

    #[test]
    fn test_zero_pivot_and_shapes() {
        // Zero leading pivot
        let err = solve_tridiagonal(&[0.0, 0.0], &[0.0, 0.0], &[0.0, 0.0], &[1.0, 1.0]).unwrap_err();
        assert_eq!(err, CoreError::SingularSystem(0));
        assert_eq!(
            solve_tridiagonal(&[0.0], &[1.0, 1.0], &[0.0, 0.0], &[1.0, 1.0]).unwrap_err(),
            CoreError::LengthMismatch { x_len: 1, y_len: 2 }
        );
        assert!(solve_tridiagonal(&[], &[], &[], &[]).unwrap().is_empty());
        assert_eq!(solve_tridiagonal(&[9.0], &[4.0], &[9.0], &[2.0]).unwrap(), vec![0.5]);
    }
}
