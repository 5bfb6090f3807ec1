//! Quadrature over sampled signals on (possibly) non-uniform grids.

use crate::error::{CoreError, CoreResult};

fn check_lengths(y: &[f64], x: &[f64]) -> CoreResult<()> {
    if y.len() != x.len() {
        return Err(CoreError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    Ok(())
}

/// Trapezoidal rule.
pub fn trapezoid(y: &[f64], x: &[f64]) -> CoreResult<f64> {
    check_lengths(y, x)?;
    let total = x
        .windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum::<f64>();
    Ok(total)
}

// Simpson over the pairs of intervals starting at 0, 2, ..., `last_start`.
fn simpson_pairs(y: &[f64], x: &[f64], last_start: usize) -> f64 {
    let mut total = 0.0;
    let mut i = 0;
    while i <= last_start {
        let h0 = x[i + 1] - x[i];
        let h1 = x[i + 2] - x[i + 1];
        let hsum = h0 + h1;
        let hprod = h0 * h1;
        let ratio = h0 / h1;
        total += hsum / 6.0
            * (y[i] * (2.0 - 1.0 / ratio)
                + y[i + 1] * (hsum * hsum / hprod)
                + y[i + 2] * (2.0 - ratio));
        i += 2;
    }
    total
}

/// Composite Simpson's rule with non-uniform spacing.
///
/// For an odd number of intervals the first `n - 1` points are integrated
/// with Simpson's rule and the final interval gets a quadratic correction
/// fitted through the last three points. Fewer than three points fall back
/// to the trapezoid rule.
pub fn simpson(y: &[f64], x: &[f64]) -> CoreResult<f64> {
    check_lengths(y, x)?;
    let n = y.len();
    if n < 3 {
        return trapezoid(y, x);
    }

    if n % 2 == 1 {
        return Ok(simpson_pairs(y, x, n - 3));
    }

    // n is even and >= 4 here
    let head = simpson_pairs(y, x, n - 4);

    let h0 = x[n - 2] - x[n - 3];
    let h1 = x[n - 1] - x[n - 2];
    let alpha = (2.0 * h1 * h1 + 3.0 * h0 * h1) / (6.0 * (h0 + h1));
    let beta = (h1 * h1 + 3.0 * h0 * h1) / (6.0 * h0);
    let eta = h1 * h1 * h1 / (6.0 * h0 * (h0 + h1));
    Ok(head + alpha * y[n - 1] + beta * y[n - 2] - eta * y[n - 3])
}
