//! Conversion of Cartesian Gaussian blocks to real solid harmonic Gaussians.

use factorial::Factorial;
use ndarray::Array2;

use crate::basis::shell::cart_tuples;

#[cfg(test)]
#[path = "solid_harmonics_tests.rs"]
mod solid_harmonics_tests;

/// Returns $`n!`$ as a float.
///
/// # Panics
///
/// Panics if the factorial overflows `u64`.
fn fact(n: u32) -> f64 {
    u64::from(n)
        .checked_factorial()
        .unwrap_or_else(|| panic!("Unable to compute the factorial of {n}.")) as f64
}

/// Binomial coefficient $`\binom{n}{k}`$, zero if $`k > n`$.
fn binom(n: u32, k: u32) -> f64 {
    if k > n {
        0.0
    } else {
        fact(n) / (fact(k) * fact(n - k))
    }
}

/// Builds the matrix $`\mathbf{T}`$ of shape $`(2l + 1) \times (l + 1)(l + 2)/2`$ such that a
/// pure shell block is $`\mathbf{T}`$ applied to the lexicographically ordered Cartesian block.
/// Rows are in increasing-$`m`$ order.
///
/// The coefficients are those of the real solid harmonics
///
/// ```math
///     S_{lm} = N_{lm} \sum_{t=0}^{\lfloor (l - |m|)/2 \rfloor} \sum_{u=0}^{t}
///         \sum_{v = v_m}^{\lfloor |m|/2 - v_m \rfloor + v_m} C^{lm}_{tuv}
///         x^{2t + |m| - 2(u + v)} y^{2(u + v)} z^{l - 2t - |m|},
/// ```
///
/// with $`N_{lm}`$ chosen such that every $`S_{lm}`$ has the norm of $`x^l`$. Since all
/// Cartesian components of a shell share the normalisation of $`x^l`$, the resulting pure
/// functions are normalised.
pub(crate) fn cart_to_pure(l: u32) -> Array2<f64> {
    let carts = cart_tuples(l);
    let li = l as i32;
    let mut t_mat = Array2::<f64>::zeros(((2 * l + 1) as usize, carts.len()));
    for (row, m) in (-li..=li).enumerate() {
        let am = m.unsigned_abs();
        let norm = (1.0 / (2f64.powi(am as i32) * fact(l)))
            * (2.0 * fact(l + am) * fact(l - am) / if m == 0 { 2.0 } else { 1.0 }).sqrt();
        // `vv` is 2v, which is even for m >= 0 and odd for m < 0.
        let vv_start = if m < 0 { 1 } else { 0 };
        for t in 0..=((l - am) / 2) {
            for u in 0..=t {
                for vv in (vv_start..=am).step_by(2) {
                    let sign_exp = t as i32 + (vv as i32 - vv_start as i32) / 2;
                    let sign = if sign_exp % 2 == 0 { 1.0 } else { -1.0 };
                    let coeff = sign
                        * 0.25f64.powi(t as i32)
                        * binom(l, t)
                        * binom(l - t, am + t)
                        * binom(t, u)
                        * binom(am, vv);
                    let lx = 2 * t + am - 2 * u - vv;
                    let ly = 2 * u + vv;
                    let lz = l - 2 * t - am;
                    if let Some(col) = carts.iter().position(|&c| c == (lx, ly, lz)) {
                        t_mat[(row, col)] += norm * coeff;
                    }
                }
            }
        }
    }
    t_mat
}

/// Applies per-axis transformations to a row-major tensor stored in `data` with dimensions
/// `dims`. Axes whose transformation is `None` are left untouched.
///
/// # Returns
///
/// The transformed data and its new dimensions.
pub(crate) fn transform_tensor(
    data: &[f64],
    dims: &[usize],
    transforms: &[Option<&Array2<f64>>],
) -> (Vec<f64>, Vec<usize>) {
    let mut current = data.to_vec();
    let mut current_dims = dims.to_vec();
    for (axis, transform) in transforms.iter().enumerate() {
        let Some(tmat) = transform else {
            continue;
        };
        let pre: usize = current_dims[..axis].iter().product();
        let post: usize = current_dims[axis + 1..].iter().product();
        let (nout, nin) = tmat.dim();
        let mut next = vec![0.0; pre * nout * post];
        for a in 0..pre {
            for m in 0..nout {
                for c in 0..nin {
                    let coeff = tmat[(m, c)];
                    if coeff == 0.0 {
                        continue;
                    }
                    let src = &current[(a * nin + c) * post..(a * nin + c + 1) * post];
                    let dst = &mut next[(a * nout + m) * post..(a * nout + m + 1) * post];
                    dst.iter_mut().zip(src.iter()).for_each(|(d, s)| *d += coeff * s);
                }
            }
        }
        current = next;
        current_dims[axis] = nout;
    }
    (current, current_dims)
}
