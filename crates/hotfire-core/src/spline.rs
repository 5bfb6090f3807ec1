//! Cubic spline interpolation with prescribed end slopes.
//!
//! Stored as knot values plus second derivatives. Outside the knot range the
//! first and last cubic pieces are extended, so the spline can be sampled a
//! little past the data (the central differences used for mass flow do).

use crate::error::{CoreError, CoreResult};
use crate::tridiag::solve_tridiagonal;

#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    // Second derivative at each knot
    m: Vec<f64>,
}

impl CubicSpline {
    /// Clamped spline: first derivative zero at both ends.
    pub fn clamped(x: &[f64], y: &[f64]) -> CoreResult<Self> {
        Self::with_end_slopes(x, y, 0.0, 0.0)
    }

    pub fn with_end_slopes(x: &[f64], y: &[f64], start_slope: f64, end_slope: f64) -> CoreResult<Self> {
        if x.len() != y.len() {
            return Err(CoreError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        let n = x.len();
        if n < 2 {
            return Err(CoreError::TooFewKnots(n));
        }
        for (i, w) in x.windows(2).enumerate() {
            if !(w[1] > w[0]) {
                return Err(CoreError::NonIncreasingKnots {
                    index: i + 1,
                    prev: w[0],
                    next: w[1],
                });
            }
        }

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let slope: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

        let mut a = vec![0.0; n];
        let mut b = vec![0.0; n];
        let mut c = vec![0.0; n];
        let mut d = vec![0.0; n];

        b[0] = 2.0 * h[0];
        c[0] = h[0];
        d[0] = 6.0 * (slope[0] - start_slope);

        for i in 1..n - 1 {
            a[i] = h[i - 1];
            b[i] = 2.0 * (h[i - 1] + h[i]);
            c[i] = h[i];
            d[i] = 6.0 * (slope[i] - slope[i - 1]);
        }

        a[n - 1] = h[n - 2];
        b[n - 1] = 2.0 * h[n - 2];
        d[n - 1] = 6.0 * (end_slope - slope[n - 2]);

        let m = solve_tridiagonal(&a, &b, &c, &d)?;

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    fn segment(&self, t: f64) -> usize {
        let n = self.x.len();
        self.x.partition_point(|&xi| xi <= t).saturating_sub(1).min(n - 2)
    }

    pub fn eval(&self, t: f64) -> f64 {
        let i = self.segment(t);
        let h = self.x[i + 1] - self.x[i];
        let (m0, m1) = (self.m[i], self.m[i + 1]);
        // Linear coefficient of segment i
        let b = (self.y[i + 1] - self.y[i]) / h - h * (2.0 * m0 + m1) / 6.0;
        let dx = t - self.x[i];
        self.y[i] + b * dx + 0.5 * m0 * dx * dx + (m1 - m0) / (6.0 * h) * dx * dx * dx
    }

    /// Three-point central difference of the spline with step `dx`.
    pub fn central_difference(&self, t: f64, dx: f64) -> f64 {
        central_difference(|s| self.eval(s), t, dx)
    }
}

/// `(f(x + dx) - f(x - dx)) / (2 dx)`
pub fn central_difference<F: Fn(f64) -> f64>(f: F, x: f64, dx: f64) -> f64 {
    (f(x + dx) - f(x - dx)) / (2.0 * dx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| a + (b - a) * i as f64 / (n - 1) as f64)
            .collect()
    }

    #[test]
    fn test_interpolates_knots() {
        let x = vec![0.0, 0.4, 1.0, 1.7, 2.0];
        let y = vec![1.0, -2.0, 0.5, 3.0, 2.0];
        let s = CubicSpline::clamped(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(&y) {
            assert!((s.eval(*xi) - yi).abs() < 1e-12, "s({xi}) != {yi}");
        }
    }

    #[test]
    fn test_clamped_end_slopes() {
        let x = linspace(0.0, 3.0, 12);
        let y: Vec<f64> = x.iter().map(|t| t * t).collect();
        let s = CubicSpline::clamped(&x, &y).unwrap();
        assert!(s.central_difference(0.0, 1e-6).abs() < 1e-6);
        assert!(s.central_difference(3.0, 1e-6).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_fit() {
        // cos has zero slope at 0 and pi, so the clamped fit is natural
        let x = linspace(0.0, PI, 40);
        let y: Vec<f64> = x.iter().map(|t| t.cos()).collect();
        let s = CubicSpline::clamped(&x, &y).unwrap();
        for t in [0.3, 1.1, 2.0, 2.9] {
            assert!((s.eval(t) - t.cos()).abs() < 1e-5);
            assert!((s.central_difference(t, 1e-5) + t.sin()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_constant_data() {
        let x = linspace(0.0, 1.0, 6);
        let s = CubicSpline::clamped(&x, &[2.0; 6]).unwrap();
        assert!((s.eval(0.37) - 2.0).abs() < 1e-14);
        assert!(s.central_difference(0.81, 1.0).abs() < 1e-12);
        // Extrapolation continues the end pieces
        assert!((s.eval(-0.5) - 2.0).abs() < 1e-12);
        assert!((s.eval(1.5) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_central_difference_tracks_slope() {
        let x = linspace(0.0, 10.0, 101);
        let y: Vec<f64> = x.iter().map(|t| (t / 3.0).sin()).collect();
        let s = CubicSpline::clamped(&x, &y).unwrap();
        let fd = s.central_difference(5.0, 1e-4);
        assert!((fd - (5.0f64 / 3.0).cos() / 3.0).abs() < 1e-4);
        assert!((central_difference(|t| t * t, 2.0, 1.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_knots() {
        let s = CubicSpline::clamped(&[0.0, 1.0], &[0.0, 1.0]).unwrap();
        assert!((s.eval(0.5) - 0.5).abs() < 1e-12);
        assert!(s.central_difference(0.0, 1e-6).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_knots() {
        assert_eq!(
            CubicSpline::clamped(&[1.0], &[1.0]).unwrap_err(),
            CoreError::TooFewKnots(1)
        );
        assert!(matches!(
            CubicSpline::clamped(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0]).unwrap_err(),
            CoreError::NonIncreasingKnots { index: 2, .. }
        ));
        assert!(CubicSpline::clamped(&[0.0, 1.0], &[0.0]).is_err());
    }
}
