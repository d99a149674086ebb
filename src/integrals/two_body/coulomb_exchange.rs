//! Direct construction of Coulomb and exchange matrices.

use std::fmt;

use anyhow::{self, ensure};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::basis::basis_set::BasisSet;
use crate::integrals::density::{DensityMatrix, SpinMatrix};
use crate::integrals::two_body::digester::{Digester, PerThread};
use crate::integrals::two_body::symmetry::QuartetIndex;
use crate::integrals::IntegralSpecifier;

/// Coulomb and exchange matrices with the spin structure of the density they were built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoulombExchange {
    /// $`J_{ij} = \sum_{kl} (ij|kl) D_{kl}`$.
    pub coulomb: SpinMatrix,

    /// $`K_{ik} = \sum_{jl} (ij|kl) D_{jl}`$.
    pub exchange: SpinMatrix,
}

impl fmt::Display for CoulombExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blocks = |m: &SpinMatrix| match m {
            SpinMatrix::Restricted(_) => "restricted",
            SpinMatrix::Unrestricted { beta: Some(_), .. } => "alpha and beta",
            SpinMatrix::Unrestricted { beta: None, .. } => "alpha",
        };
        writeln!(f, "Coulomb matrix blocks: {}", blocks(&self.coulomb))?;
        writeln!(f, "Exchange matrix blocks: {}", blocks(&self.exchange))
    }
}

/// The per-thread accumulator of Coulomb and exchange contributions.
#[derive(Clone, Debug)]
pub struct CoulombExchangeConstructor<'a> {
    density: &'a DensityMatrix,
    coulomb: SpinMatrix,
    exchange: SpinMatrix,
}

/// Adds the six contributions of one scaled integral $`v = (ij|kl)`$.
fn accumulate(
    coulomb: &mut Array2<f64>,
    exchange: &mut Array2<f64>,
    density: &Array2<f64>,
    value: f64,
    [i, j, k, l]: QuartetIndex,
) {
    let half = 0.5 * value;
    let quarter = 0.25 * value;
    coulomb[(i, j)] += density[(k, l)] * half;
    coulomb[(k, l)] += density[(i, j)] * half;
    exchange[(i, k)] += density[(j, l)] * quarter;
    exchange[(j, l)] += density[(i, k)] * quarter;
    exchange[(i, l)] += density[(j, k)] * quarter;
    exchange[(j, k)] += density[(i, l)] * quarter;
}

impl<'a> CoulombExchangeConstructor<'a> {
    fn new(density: &'a DensityMatrix) -> Self {
        Self {
            density,
            coulomb: SpinMatrix::zeros_like(density),
            exchange: SpinMatrix::zeros_like(density),
        }
    }

    fn evaluate_quartet(&mut self, value: f64, index: QuartetIndex) {
        match (self.density, &mut self.coulomb, &mut self.exchange) {
            (DensityMatrix::Restricted(d), SpinMatrix::Restricted(j), SpinMatrix::Restricted(k)) => {
                accumulate(j, k, d, value, index);
            }
            (
                DensityMatrix::Unrestricted { alpha, beta },
                SpinMatrix::Unrestricted {
                    alpha: j_alpha,
                    beta: j_beta,
                },
                SpinMatrix::Unrestricted {
                    alpha: k_alpha,
                    beta: k_beta,
                },
            ) => {
                accumulate(j_alpha, k_alpha, alpha, value, index);
                if let (Some(d), Some(j), Some(k)) = (beta, j_beta, k_beta) {
                    accumulate(j, k, d, value, index);
                }
            }
            _ => {}
        }
    }

    fn finalize_evaluation(&mut self) {
        self.coulomb.symmetrise();
        self.exchange.symmetrise();
    }
}

/// Builds Coulomb and exchange matrices from a density without storing the four-index tensor.
///
/// Quartets arrive from the fully reduced traversal, so each value is weighted by the number of
/// shell quartets it stands for.
pub struct CoulombExchangeDigester<'a> {
    density: &'a DensityMatrix,
    scaling: f64,
    constructors: PerThread<CoulombExchangeConstructor<'a>>,
}

impl<'a> CoulombExchangeDigester<'a> {
    /// Creates a new Coulomb–exchange digester.
    ///
    /// # Errors
    ///
    /// Errors if derivatives are requested, the two basis sets differ, or the density does not
    /// match the basis set.
    pub fn new(
        basis1: &BasisSet,
        basis2: &BasisSet,
        specifier: &IntegralSpecifier,
        density: &'a DensityMatrix,
    ) -> Result<Self, anyhow::Error> {
        ensure!(
            specifier.deriv_order == 0,
            "Derivative of the Fock matrix not available, yet!"
        );
        ensure!(
            basis1 == basis2,
            "Coulomb and exchange matrices require the same basis set on both sides."
        );
        ensure!(
            density.dim() == basis1.n_funcs(),
            "The density matrix has dimension {}, but the basis set has {} functions.",
            density.dim(),
            basis1.n_funcs()
        );
        Ok(Self {
            density,
            scaling: specifier.two_body_scaling(),
            constructors: PerThread::new(1, || CoulombExchangeConstructor::new(density)),
        })
    }
}

impl<'a> Digester for CoulombExchangeDigester<'a> {
    type Accumulator = CoulombExchangeConstructor<'a>;

    type Output = CoulombExchange;

    fn initialize(&mut self, n_threads: usize) {
        let density = self.density;
        self.constructors = PerThread::new(n_threads, || CoulombExchangeConstructor::new(density));
    }

    fn bra_ket_symmetric(&self) -> bool {
        true
    }

    fn compute_degeneracy(&self, [s1, s2, s3, s4]: [usize; 4]) -> f64 {
        let bra = if s1 == s2 { 1.0 } else { 2.0 };
        let ket = if s3 == s4 { 1.0 } else { 2.0 };
        let bra_ket = if s1 == s3 && s2 == s4 { 1.0 } else { 2.0 };
        bra * ket * bra_ket
    }

    fn with_accumulator<F>(&self, f: F)
    where
        F: FnOnce(&mut Self::Accumulator),
    {
        self.constructors.with(f);
    }

    fn digest(
        &self,
        accumulator: &mut Self::Accumulator,
        value: f64,
        index: QuartetIndex,
        _: usize,
        degeneracy: f64,
    ) {
        accumulator.evaluate_quartet(value * self.scaling * degeneracy, index);
    }

    fn finalize(self) -> Result<Self::Output, anyhow::Error> {
        let mut result = CoulombExchange {
            coulomb: SpinMatrix::zeros_like(self.density),
            exchange: SpinMatrix::zeros_like(self.density),
        };
        for mut constructor in self.constructors.into_inner() {
            constructor.finalize_evaluation();
            result.coulomb.add_assign(&constructor.coulomb)?;
            result.exchange.add_assign(&constructor.exchange)?;
        }
        Ok(result)
    }
}
