//! Electron-repulsion McMurchie–Davidson kernel.

use std::f64::consts::PI;

use ndarray::Array2;

use crate::integrals::engine::hermite::{HermiteCoefficients, HermiteCoulomb};
use crate::integrals::engine::solid_harmonics::transform_tensor;
use crate::integrals::engine::{centre_derivative, Engine, EngineShell, ShellPairIntermediates};

/// Hermite coefficients of one primitive pair along the three Cartesian directions.
type PairHermite = [HermiteCoefficients; 3];

fn pair_hermite(
    pair: &ShellPairIntermediates,
    a: &EngineShell,
    b: &EngineShell,
    deriv: usize,
) -> Vec<PairHermite> {
    pair.primitive_pairs
        .iter()
        .map(|pp| {
            [0, 1, 2].map(|k| {
                HermiteCoefficients::new(
                    a.l + deriv,
                    b.l + deriv,
                    pp.p,
                    pp.centre[k] - a.origin[k],
                    pp.centre[k] - b.origin[k],
                )
            })
        })
        .collect()
}

/// $`\sum_{tuv} E^{ab}_{tuv} \sum_{\tau\nu\phi} (-1)^{\tau+\nu+\phi} E^{cd}_{\tau\nu\phi}
/// R_{t+\tau, u+\nu, v+\phi}`$ for one set of Cartesian exponents.
fn hermite_contract(
    eab: &PairHermite,
    ecd: &PairHermite,
    r: &HermiteCoulomb,
    exps: [[usize; 3]; 4],
) -> f64 {
    let [ia, ib, ic, id] = exps;
    let ex = eab[0].slice(ia[0], ib[0]);
    let ey = eab[1].slice(ia[1], ib[1]);
    let ez = eab[2].slice(ia[2], ib[2]);
    let fx = ecd[0].slice(ic[0], id[0]);
    let fy = ecd[1].slice(ic[1], id[1]);
    let fz = ecd[2].slice(ic[2], id[2]);

    let mut sum = 0.0;
    for (tau, ftau) in fx.iter().enumerate() {
        for (nu, fnu) in fy.iter().enumerate() {
            for (phi, fphi) in fz.iter().enumerate() {
                let sign = if (tau + nu + phi) % 2 == 0 { 1.0 } else { -1.0 };
                let fket = sign * ftau * fnu * fphi;
                if fket == 0.0 {
                    continue;
                }
                let mut bra = 0.0;
                for (t, et) in ex.iter().enumerate() {
                    for (u, eu) in ey.iter().enumerate() {
                        let etu = et * eu;
                        for (v, ev) in ez.iter().enumerate() {
                            bra += etu * ev * r.get(t + tau, u + nu, v + phi);
                        }
                    }
                }
                sum += fket * bra;
            }
        }
    }
    sum
}

pub(super) fn compute(
    engine: &Engine,
    shells: [&EngineShell; 4],
    pair_ab: &ShellPairIntermediates,
    pair_cd: &ShellPairIntermediates,
) -> Option<Array2<f64>> {
    let [a, b, c, d] = shells;
    let deriv = engine.deriv_order() as usize;
    let n_rows = if deriv == 0 { 1 } else { 12 };
    let ncart = shells.map(|s| s.n_cart());
    let n_total = ncart.iter().product::<usize>();
    let l_total = a.l + b.l + c.l + d.l + deriv;

    let eabs = pair_hermite(pair_ab, a, b, deriv);
    let ecds = pair_hermite(pair_cd, c, d, deriv);

    let mut cart = vec![0.0; n_rows * n_total];
    let mut computed = false;
    for (ab, eab) in pair_ab.primitive_pairs.iter().zip(eabs.iter()) {
        for (cd, ecd) in pair_cd.primitive_pairs.iter().zip(ecds.iter()) {
            let (p, q) = (ab.p, cd.p);
            let prefactor =
                2.0 * PI.powf(2.5) / (p * q * (p + q).sqrt()) * ab.prefactor * cd.prefactor;
            if prefactor.abs() < engine.precision() {
                continue;
            }
            computed = true;
            let rpq = [0, 1, 2].map(|k| ab.centre[k] - cd.centre[k]);
            let r = HermiteCoulomb::new(p * q / (p + q), rpq, l_total, engine.context().boys());
            let zetas = [ab.alpha, ab.beta, cd.alpha, cd.beta];

            let mut col = 0;
            for &ia in a.carts.iter() {
                for &ib in b.carts.iter() {
                    for &ic in c.carts.iter() {
                        for &id in d.carts.iter() {
                            let exps = [ia, ib, ic, id];
                            if deriv == 0 {
                                cart[col] += prefactor * hermite_contract(eab, ecd, &r, exps);
                            } else {
                                for (centre, &zeta) in zetas.iter().enumerate() {
                                    for x in 0..3 {
                                        let value = centre_derivative(
                                            exps[centre],
                                            x,
                                            zeta,
                                            |shifted_exps| {
                                                let mut all = exps;
                                                all[centre] = shifted_exps;
                                                hermite_contract(eab, ecd, &r, all)
                                            },
                                        );
                                        cart[(centre * 3 + x) * n_total + col] += prefactor * value;
                                    }
                                }
                            }
                            col += 1;
                        }
                    }
                }
            }
        }
    }
    if !computed {
        return None;
    }

    let transforms = shells.map(|s| s.transform(engine.context()));
    let n_funcs = shells.map(|s| s.n_funcs());
    let mut result = Array2::<f64>::zeros((n_rows, n_funcs.iter().product()));
    for (row, chunk) in cart.chunks_exact(n_total).enumerate() {
        let (transformed, _) = transform_tensor(chunk, &ncart, &transforms);
        result
            .row_mut(row)
            .iter_mut()
            .zip(transformed.iter())
            .for_each(|(dst, src)| *dst = *src);
    }
    Some(result)
}
