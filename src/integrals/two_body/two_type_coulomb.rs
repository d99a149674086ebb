//! Direct construction of the Coulomb matrices coupling two particle types.

use std::fmt;

use anyhow::{self, ensure};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::basis::basis_set::BasisSet;
use crate::integrals::density::DensityMatrix;
use crate::integrals::two_body::digester::{Digester, PerThread};
use crate::integrals::two_body::symmetry::{IntegralSymmetry, QuartetIndex};
use crate::integrals::IntegralSpecifier;

/// The Coulomb matrices felt by each particle type from the other.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TwoTypeCoulomb {
    /// $`J^{(1)}_{ij} = \sum_{kl} (ij|kl) D^{(2)}_{kl}`$ in the first basis set.
    pub coulomb1: Array2<f64>,

    /// $`J^{(2)}_{kl} = \sum_{ij} (ij|kl) D^{(1)}_{ij}`$ in the second basis set.
    pub coulomb2: Array2<f64>,
}

impl fmt::Display for TwoTypeCoulomb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Two-type Coulomb matrices: {}×{} and {}×{}",
            self.coulomb1.nrows(),
            self.coulomb1.ncols(),
            self.coulomb2.nrows(),
            self.coulomb2.ncols()
        )
    }
}

/// Builds [`TwoTypeCoulomb`] from the total densities of both particle types.
///
/// Bra and ket come from different basis sets, so only the symmetry within each pair is used:
/// a value is digested once for its canonical quadruplet and spread over the pair-swapped
/// quadruplets.
pub struct TwoTypeCoulombDigester {
    density1: Array2<f64>,
    density2: Array2<f64>,
    scaling: f64,
    accumulators: PerThread<(Array2<f64>, Array2<f64>)>,
}

impl TwoTypeCoulombDigester {
    /// Creates a new two-type Coulomb digester.
    ///
    /// # Arguments
    ///
    /// * `basis1` - The basis set of the first particle type.
    /// * `basis2` - The basis set of the second particle type.
    /// * `specifier` - The description of the integrals, whose particle types set the scaling.
    /// * `density1` - The density of the first particle type.
    /// * `density2` - The density of the second particle type.
    ///
    /// # Errors
    ///
    /// Errors if derivatives are requested or a density does not match its basis set.
    pub fn new(
        basis1: &BasisSet,
        basis2: &BasisSet,
        specifier: &IntegralSpecifier,
        density1: &DensityMatrix,
        density2: &DensityMatrix,
    ) -> Result<Self, anyhow::Error> {
        ensure!(
            specifier.deriv_order == 0,
            "Derivative of the Fock matrix not available, yet!"
        );
        for (i, (basis, density)) in [(basis1, density1), (basis2, density2)]
            .into_iter()
            .enumerate()
        {
            ensure!(
                density.dim() == basis.n_funcs(),
                "Density matrix {} has dimension {}, but its basis set has {} functions.",
                i + 1,
                density.dim(),
                basis.n_funcs()
            );
        }
        let density1 = density1.restricted();
        let density2 = density2.restricted();
        let (dim1, dim2) = (density1.dim(), density2.dim());
        Ok(Self {
            density1,
            density2,
            scaling: specifier.two_body_scaling(),
            accumulators: PerThread::new(1, || (Array2::zeros(dim1), Array2::zeros(dim2))),
        })
    }
}

impl Digester for TwoTypeCoulombDigester {
    type Accumulator = (Array2<f64>, Array2<f64>);

    type Output = TwoTypeCoulomb;

    fn initialize(&mut self, n_threads: usize) {
        let dim1 = self.density1.dim();
        let dim2 = self.density2.dim();
        self.accumulators =
            PerThread::new(n_threads, || (Array2::zeros(dim1), Array2::zeros(dim2)));
    }

    fn bra_ket_symmetric(&self) -> bool {
        false
    }

    fn compute_degeneracy(&self, _: [usize; 4]) -> f64 {
        1.0
    }

    fn with_accumulator<F>(&self, f: F)
    where
        F: FnOnce(&mut Self::Accumulator),
    {
        self.accumulators.with(f);
    }

    fn digest(
        &self,
        accumulator: &mut Self::Accumulator,
        value: f64,
        index: QuartetIndex,
        _: usize,
        _: f64,
    ) {
        if index != IntegralSymmetry::Fourfold.mapped_index(index) {
            return;
        }
        let value = value * self.scaling;
        let (coulomb1, coulomb2) = accumulator;
        for [i, j, k, l] in IntegralSymmetry::Fourfold.symmetric_indices(index) {
            coulomb1[(i, j)] += self.density2[(k, l)] * value;
            coulomb2[(k, l)] += self.density1[(i, j)] * value;
        }
    }

    fn finalize(self) -> Result<Self::Output, anyhow::Error> {
        let mut coulomb1 = Array2::<f64>::zeros(self.density1.dim());
        let mut coulomb2 = Array2::<f64>::zeros(self.density2.dim());
        for (j1, j2) in self.accumulators.into_inner() {
            ensure!(
                j1.dim() == coulomb1.dim() && j2.dim() == coulomb2.dim(),
                "Coulomb accumulators do not match the density matrices."
            );
            coulomb1 = coulomb1 + (&j1 + &j1.t()) * 0.5;
            coulomb2 = coulomb2 + (&j2 + &j2.t()) * 0.5;
        }
        Ok(TwoTypeCoulomb { coulomb1, coulomb2 })
    }
}
