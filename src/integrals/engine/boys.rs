//! Tabulated Boys function
//!
//! ```math
//!     F_n(T) = \int_0^1 t^{2n} \exp(-T t^2) \, \mathrm{d}t.
//! ```
//!
//! Values on a regular grid in $`T`$ are interpolated by a downward Taylor expansion, and the
//! asymptotic form is used beyond the end of the grid.

use std::f64::consts::PI;

#[cfg(test)]
#[path = "boys_tests.rs"]
mod boys_tests;

/// Grid spacing in $`T`$.
const GRID_STEP: f64 = 0.05;

/// End of the tabulated range. The asymptotic form is exact to machine precision beyond this.
const GRID_MAX: f64 = 50.0;

/// Number of terms in the Taylor interpolation.
const TAYLOR_ORDER: usize = 7;

/// A table of Boys function values on a regular grid.
#[derive(Clone, Debug)]
pub(crate) struct BoysTable {
    /// The highest order that can be evaluated.
    nmax: usize,

    /// The number of orders stored per grid point (`nmax + TAYLOR_ORDER + 1`).
    stride: usize,

    /// Tabulated values, grid point major.
    values: Vec<f64>,
}

impl BoysTable {
    /// Tabulates the Boys function for orders up to and including `nmax`.
    pub(crate) fn new(nmax: usize) -> Self {
        let stride = nmax + TAYLOR_ORDER + 1;
        let npoints = (GRID_MAX / GRID_STEP).round() as usize + 1;
        let mut values = vec![0.0; npoints * stride];
        for (k, chunk) in values.chunks_exact_mut(stride).enumerate() {
            let t = k as f64 * GRID_STEP;
            boys_reference(t, chunk);
        }
        Self {
            nmax,
            stride,
            values,
        }
    }

    /// Evaluates $`F_n(T)`$ for all $`n`$ in `0..out.len()`.
    ///
    /// # Panics
    ///
    /// Panics if more orders than tabulated are requested.
    pub(crate) fn evaluate(&self, t: f64, out: &mut [f64]) {
        assert!(
            out.len() <= self.nmax + 1,
            "Boys function orders up to {} requested, but only {} tabulated.",
            out.len().saturating_sub(1),
            self.nmax
        );
        if t >= GRID_MAX {
            // F_n(T) = (2n - 1)!! / 2^(n + 1) * sqrt(pi / T^(2n + 1))
            let mut value = 0.5 * (PI / t).sqrt();
            for (n, f) in out.iter_mut().enumerate() {
                *f = value;
                value *= (2 * n + 1) as f64 / (2.0 * t);
            }
            return;
        }
        let k = (t / GRID_STEP).round() as usize;
        let dt = k as f64 * GRID_STEP - t;
        let row = &self.values[k * self.stride..(k + 1) * self.stride];
        for (n, f) in out.iter_mut().enumerate() {
            let mut term = 1.0;
            let mut sum = 0.0;
            for j in 0..TAYLOR_ORDER {
                sum += row[n + j] * term;
                term *= dt / (j + 1) as f64;
            }
            *f = sum;
        }
    }
}

/// Computes $`F_n(T)`$ for all $`n`$ in `0..out.len()` from the convergent series of the
/// highest order followed by downward recursion.
pub(crate) fn boys_reference(t: f64, out: &mut [f64]) {
    let Some(nhigh) = out.len().checked_sub(1) else {
        return;
    };
    let exp_t = (-t).exp();

    // F_n(T) = exp(-T) sum_k (2T)^k / ((2n + 1)(2n + 3)...(2n + 2k + 1))
    let mut term = 1.0 / (2 * nhigh + 1) as f64;
    let mut sum = term;
    let mut k = 1;
    while term > sum * 1e-17 && k < 2000 {
        term *= 2.0 * t / (2 * nhigh + 2 * k + 1) as f64;
        sum += term;
        k += 1;
    }
    out[nhigh] = exp_t * sum;

    for n in (0..nhigh).rev() {
        out[n] = (2.0 * t * out[n + 1] + exp_t) / (2 * n + 1) as f64;
    }
}
