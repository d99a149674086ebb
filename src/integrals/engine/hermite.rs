//! McMurchie–Davidson Hermite expansion coefficients and Hermite Coulomb integrals.
//!
//! See Helgaker, Jørgensen and Olsen, *Molecular Electronic-Structure Theory* (2000), §9.5
//! and §9.9.

use crate::integrals::engine::boys::BoysTable;

#[cfg(test)]
#[path = "hermite_tests.rs"]
mod hermite_tests;

// -------------------
// HermiteCoefficients
// -------------------

/// One-dimensional Hermite expansion coefficients $`E^{ij}_t`$ of the overlap distribution of
/// two Cartesian Gaussians, without the Gaussian prefactor $`\exp(-\mu X_{AB}^2)`$.
#[derive(Clone, Debug)]
pub(crate) struct HermiteCoefficients {
    imax: usize,
    jmax: usize,
    tdim: usize,
    data: Vec<f64>,
}

impl HermiteCoefficients {
    /// Builds the coefficients for all $`i \le i_{\mathrm{max}}`$, $`j \le j_{\mathrm{max}}`$.
    ///
    /// # Arguments
    ///
    /// * `imax`, `jmax` - Highest Cartesian exponents on the first and second centres.
    /// * `p` - Exponent sum $`\alpha + \beta`$.
    /// * `xpa`, `xpb` - Components of $`\mathbf{P} - \mathbf{A}`$ and $`\mathbf{P} - \mathbf{B}`$.
    pub(crate) fn new(imax: usize, jmax: usize, p: f64, xpa: f64, xpb: f64) -> Self {
        let tdim = imax + jmax + 1;
        let mut e = Self {
            imax,
            jmax,
            tdim,
            data: vec![0.0; (imax + 1) * (jmax + 1) * tdim],
        };
        let one_over_2p = 0.5 / p;
        e.set(0, 0, 0, 1.0);
        for i in 0..imax {
            for t in 0..=(i + 1) {
                let value = one_over_2p * e.get_signed(i, 0, t as isize - 1)
                    + xpa * e.get(i, 0, t)
                    + (t + 1) as f64 * e.get(i, 0, t + 1);
                e.set(i + 1, 0, t, value);
            }
        }
        for i in 0..=imax {
            for j in 0..jmax {
                for t in 0..=(i + j + 1) {
                    let value = one_over_2p * e.get_signed(i, j, t as isize - 1)
                        + xpb * e.get(i, j, t)
                        + (t + 1) as f64 * e.get(i, j, t + 1);
                    e.set(i, j + 1, t, value);
                }
            }
        }
        e
    }

    fn index(&self, i: usize, j: usize, t: usize) -> usize {
        (i * (self.jmax + 1) + j) * self.tdim + t
    }

    fn set(&mut self, i: usize, j: usize, t: usize, value: f64) {
        let index = self.index(i, j, t);
        self.data[index] = value;
    }

    fn get_signed(&self, i: usize, j: usize, t: isize) -> f64 {
        if t < 0 {
            0.0
        } else {
            self.get(i, j, t as usize)
        }
    }

    /// Returns $`E^{ij}_t`$, which vanishes for $`t > i + j`$.
    pub(crate) fn get(&self, i: usize, j: usize, t: usize) -> f64 {
        if t > i + j || t >= self.tdim {
            0.0
        } else {
            self.data[self.index(i, j, t)]
        }
    }

    /// Returns the slice $`E^{ij}_t`$ for $`t = 0, \ldots, i + j`$.
    pub(crate) fn slice(&self, i: usize, j: usize) -> &[f64] {
        debug_assert!(i <= self.imax && j <= self.jmax);
        let start = self.index(i, j, 0);
        &self.data[start..start + i + j + 1]
    }
}

// --------------
// HermiteCoulomb
// --------------

/// Hermite Coulomb integrals $`R_{tuv}(a, \mathbf{R})`$ for $`t + u + v \le L`$.
#[derive(Clone, Debug)]
pub(crate) struct HermiteCoulomb {
    dim: usize,
    data: Vec<f64>,
}

impl HermiteCoulomb {
    /// Evaluates $`R_{tuv}`$ by the downward-$`n`$ recursion
    ///
    /// ```math
    ///     R^{n}_{t+1,u,v} = t R^{n+1}_{t-1,u,v} + X R^{n+1}_{t,u,v},
    /// ```
    ///
    /// seeded with $`R^n_{000} = (-2a)^n F_n(a R^2)`$.
    pub(crate) fn new(a: f64, r: [f64; 3], lmax: usize, boys: &BoysTable) -> Self {
        let dim = lmax + 1;
        let idx = |n: usize, t: usize, u: usize, v: usize| ((n * dim + t) * dim + u) * dim + v;
        let mut work = vec![0.0; dim * dim * dim * dim];

        let mut fvals = vec![0.0; dim];
        boys.evaluate(a * (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]), &mut fvals);
        let mut factor = 1.0;
        for (n, f) in fvals.iter().enumerate() {
            work[idx(n, 0, 0, 0)] = factor * f;
            factor *= -2.0 * a;
        }

        for n in (0..lmax).rev() {
            let top = lmax - n;
            for t in 0..=top {
                for u in 0..=(top - t) {
                    for v in 0..=(top - t - u) {
                        if t + u + v == 0 {
                            continue;
                        }
                        let value = if t > 0 {
                            let lower = if t > 1 {
                                (t - 1) as f64 * work[idx(n + 1, t - 2, u, v)]
                            } else {
                                0.0
                            };
                            lower + r[0] * work[idx(n + 1, t - 1, u, v)]
                        } else if u > 0 {
                            let lower = if u > 1 {
                                (u - 1) as f64 * work[idx(n + 1, t, u - 2, v)]
                            } else {
                                0.0
                            };
                            lower + r[1] * work[idx(n + 1, t, u - 1, v)]
                        } else {
                            let lower = if v > 1 {
                                (v - 1) as f64 * work[idx(n + 1, t, u, v - 2)]
                            } else {
                                0.0
                            };
                            lower + r[2] * work[idx(n + 1, t, u, v - 1)]
                        };
                        work[idx(n, t, u, v)] = value;
                    }
                }
            }
        }

        work.truncate(dim * dim * dim);
        Self { dim, data: work }
    }

    /// Returns $`R_{tuv}`$.
    pub(crate) fn get(&self, t: usize, u: usize, v: usize) -> f64 {
        self.data[(t * self.dim + u) * self.dim + v]
    }
}
