//! Gaussian smoothing of uniformly indexed signals.
//!
//! Sigma is given in samples, not seconds. The kernel is truncated at
//! `truncate` standard deviations and the signal is extended past both ends
//! by half-sample symmetric reflection (`d c b a | a b c d | d c b a`).

use crate::error::{CoreError, CoreResult};

/// Kernel half-widths beyond this many sigmas are dropped.
pub const DEFAULT_TRUNCATE: f64 = 4.0;

/// Normalized Gaussian weights for offsets `-r..=r`, `r = floor(truncate * sigma + 0.5)`.
pub fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    let radius = (truncate * sigma + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|i| {
            let z = i as f64 / sigma;
            (-0.5 * z * z).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

#[inline]
fn reflect_index(j: isize, n: usize) -> usize {
    let n = n as isize;
    let m = j.rem_euclid(2 * n);
    let idx = if m < n { m } else { 2 * n - 1 - m };
    idx as usize
}

/// Smooth `signal` with a Gaussian of standard deviation `sigma` samples.
///
/// `sigma == 0` returns the signal unchanged.
pub fn gaussian_filter(signal: &[f64], sigma: f64) -> CoreResult<Vec<f64>> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(CoreError::InvalidSigma(sigma));
    }
    if sigma == 0.0 || signal.is_empty() {
        return Ok(signal.to_vec());
    }

    let kernel = gaussian_kernel(sigma, DEFAULT_TRUNCATE);
    let radius = (kernel.len() / 2) as isize;
    let n = signal.len();

    let out = (0..n as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * signal[reflect_index(i + k as isize - radius, n)])
                .sum::<f64>()
        })
        .collect();
    Ok(out)
}
