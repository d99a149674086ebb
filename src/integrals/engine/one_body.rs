//! One-body McMurchie–Davidson kernels.

use std::f64::consts::PI;

use ndarray::Array2;

use crate::integrals::engine::hermite::{HermiteCoefficients, HermiteCoulomb};
use crate::integrals::engine::solid_harmonics::transform_tensor;
use crate::integrals::engine::{
    centre_derivative, Engine, EngineOperator, EngineShell, ShellPairIntermediates,
};

/// Overlap of one Cartesian direction: $`E^{ij}_0 \sqrt{\pi / p}`$.
fn overlap_1d(e: &HermiteCoefficients, i: usize, j: usize, p: f64) -> f64 {
    e.get(i, j, 0) * (PI / p).sqrt()
}

/// Kinetic energy of one Cartesian direction,
/// $`-\tfrac{1}{2}[j(j-1) S_{i,j-2} - 2\beta(2j+1) S_{ij} + 4\beta^2 S_{i,j+2}]`$.
fn kinetic_1d(e: &HermiteCoefficients, i: usize, j: usize, p: f64, beta: f64) -> f64 {
    let lower = if j >= 2 {
        (j * (j - 1)) as f64 * overlap_1d(e, i, j - 2, p)
    } else {
        0.0
    };
    -0.5 * (lower - 2.0 * beta * (2 * j + 1) as f64 * overlap_1d(e, i, j, p)
        + 4.0 * beta * beta * overlap_1d(e, i, j + 2, p))
}

/// First moment of one Cartesian direction about a coordinate whose offset from the product
/// centre is `xpo`.
fn moment_1d(e: &HermiteCoefficients, i: usize, j: usize, p: f64, xpo: f64) -> f64 {
    (e.get(i, j, 1) + xpo * e.get(i, j, 0)) * (PI / p).sqrt()
}

pub(super) fn compute(engine: &Engine, a: &EngineShell, b: &EngineShell) -> Option<Array2<f64>> {
    let pairs = ShellPairIntermediates::new(a, b, engine.ln_precision());
    if pairs.is_empty() {
        return None;
    }

    let operator = engine.operator();
    let deriv = engine.deriv_order() as usize;
    let n_centres = engine.n_centres_one_body();
    let n_derivs = engine.n_derivs();
    let n_rows = operator.n_components() * n_centres * n_derivs;
    let (nca, ncb) = (a.n_cart(), b.n_cart());
    let ncab = nca * ncb;
    let row = |component: usize, centre: usize, d: usize| {
        (component * n_centres * n_derivs + centre * n_derivs + d) * ncab
    };

    let extra_b = if matches!(operator, EngineOperator::Kinetic) {
        2
    } else {
        0
    };
    let n_terms = match operator {
        EngineOperator::Nuclear(charges) => charges.len(),
        EngineOperator::Dipole(_) => 3,
        _ => 1,
    };

    let mut cart = vec![0.0; n_rows * ncab];
    for pp in pairs.primitive_pairs.iter() {
        let e = [0, 1, 2].map(|k| {
            HermiteCoefficients::new(
                a.l + deriv,
                b.l + deriv + extra_b,
                pp.p,
                pp.centre[k] - a.origin[k],
                pp.centre[k] - b.origin[k],
            )
        });
        let coulomb = match operator {
            EngineOperator::Nuclear(charges) => charges
                .iter()
                .map(|charge| {
                    let rpc = [0, 1, 2].map(|k| pp.centre[k] - charge.position[k]);
                    HermiteCoulomb::new(pp.p, rpc, a.l + b.l + deriv, engine.context().boys())
                })
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        };

        let term = |ia: [usize; 3], ib: [usize; 3], k: usize| -> f64 {
            match operator {
                EngineOperator::Overlap => (0..3)
                    .map(|x| overlap_1d(&e[x], ia[x], ib[x], pp.p))
                    .product(),
                EngineOperator::Kinetic => {
                    let s = [0, 1, 2].map(|x| overlap_1d(&e[x], ia[x], ib[x], pp.p));
                    let t = [0, 1, 2].map(|x| kinetic_1d(&e[x], ia[x], ib[x], pp.p, pp.beta));
                    t[0] * s[1] * s[2] + s[0] * t[1] * s[2] + s[0] * s[1] * t[2]
                }
                EngineOperator::Dipole(origin) => (0..3)
                    .map(|x| {
                        if x == k {
                            moment_1d(&e[x], ia[x], ib[x], pp.p, pp.centre[x] - origin[x])
                        } else {
                            overlap_1d(&e[x], ia[x], ib[x], pp.p)
                        }
                    })
                    .product(),
                EngineOperator::Nuclear(charges) => {
                    let r = &coulomb[k];
                    let ex = e[0].slice(ia[0], ib[0]);
                    let ey = e[1].slice(ia[1], ib[1]);
                    let ez = e[2].slice(ia[2], ib[2]);
                    let mut sum = 0.0;
                    for (t, ext) in ex.iter().enumerate() {
                        for (u, eyu) in ey.iter().enumerate() {
                            let exy = ext * eyu;
                            for (v, ezv) in ez.iter().enumerate() {
                                sum += exy * ezv * r.get(t, u, v);
                            }
                        }
                    }
                    -charges[k].charge * 2.0 * PI / pp.p * sum
                }
                EngineOperator::Coulomb => 0.0,
            }
        };

        for (ica, &ia) in a.carts.iter().enumerate() {
            for (icb, &ib) in b.carts.iter().enumerate() {
                let col = ica * ncb + icb;
                for k in 0..n_terms {
                    let component = if matches!(operator, EngineOperator::Dipole(_)) {
                        k
                    } else {
                        0
                    };
                    if deriv == 0 {
                        cart[row(component, 0, 0) + col] += pp.prefactor * term(ia, ib, k);
                        continue;
                    }
                    for d in 0..3 {
                        let da = centre_derivative(ia, d, pp.alpha, |ea| term(ea, ib, k));
                        let db = centre_derivative(ib, d, pp.beta, |eb| term(ia, eb, k));
                        cart[row(component, 0, d) + col] += pp.prefactor * da;
                        cart[row(component, 1, d) + col] += pp.prefactor * db;
                        if matches!(operator, EngineOperator::Nuclear(_)) {
                            // Translational invariance of each charge's contribution.
                            cart[row(component, 2 + k, d) + col] -= pp.prefactor * (da + db);
                        }
                    }
                }
            }
        }
    }

    let transforms = [a.transform(engine.context()), b.transform(engine.context())];
    let (nfa, nfb) = (a.n_funcs(), b.n_funcs());
    let mut result = Array2::<f64>::zeros((n_rows, nfa * nfb));
    for (r, chunk) in cart.chunks_exact(ncab).enumerate() {
        let (transformed, _) = transform_tensor(chunk, &[nca, ncb], &transforms);
        result
            .row_mut(r)
            .iter_mut()
            .zip(transformed.iter())
            .for_each(|(dst, src)| *dst = *src);
    }
    Some(result)
}
