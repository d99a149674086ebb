//! Digesters storing the four-index tensor with the mass-polarisation coupling removed.

use std::sync::{Mutex, PoisonError};

use anyhow::{self, ensure, format_err};
use ndarray::Array2;

use crate::basis::basis_set::BasisSet;
use crate::integrals::engine::EngineContext;
use crate::integrals::one_body::OneBodyEvaluator;
use crate::integrals::two_body::digester::Digester;
use crate::integrals::two_body::saver::two_body_result_keys;
use crate::integrals::two_body::symmetry::{permute, IntegralSymmetry, QuartetIndex};
use crate::integrals::{
    get_result, Component, DerivKey, IntegralEvaluatorMap, IntegralSpecifier, Operator,
    ResultKey,
};

/// Writes of one value: the position permutation and the sign with which the coupling term
/// enters.
const TWOFOLD_WRITES: [(QuartetIndex, f64); 4] = [
    ([0, 1, 2, 3], -1.0),
    ([1, 0, 3, 2], -1.0),
    ([1, 0, 2, 3], 1.0),
    ([0, 1, 3, 2], 1.0),
];

const FOURFOLD_WRITES: [(QuartetIndex, f64); 8] = [
    ([0, 1, 2, 3], -1.0),
    ([1, 0, 3, 2], -1.0),
    ([1, 0, 2, 3], 1.0),
    ([0, 1, 3, 2], 1.0),
    ([2, 3, 0, 1], -1.0),
    ([3, 2, 1, 0], -1.0),
    ([3, 2, 0, 1], 1.0),
    ([2, 3, 1, 0], 1.0),
];

/// Stores $`(ij|kl) - C_{ijkl}`$ with the centre-of-mass coupling
/// $`C_{ijkl} = -\frac{1}{M} \sum_{x,y,z} S'_{ij} S'_{kl}`$, where $`S'`$ are the bra-centre
/// derivatives of the overlap integrals of each basis set and $`M`$ is the total mass.
///
/// $`S'`$ is antisymmetric, so swapping the functions of one pair flips the sign of the
/// coupling. The twofold variant serves two different basis sets, the fourfold variant one basis
/// set on both sides.
///
/// Only digested quartets are written. A position whose Coulomb integral is exactly zero is
/// skipped together with its coupling and stays zero in the output.
#[derive(Debug)]
pub struct COMSaverDigester {
    symmetry: IntegralSymmetry,
    dims: (usize, usize),
    scaling: f64,
    total_mass: f64,
    overlap_derivatives: [Vec<Array2<f64>>; 2],
    keys: Vec<ResultKey>,
    results: Mutex<Vec<Array2<f64>>>,
}

/// $`\langle \partial_A a | b \rangle`$ along x, y and z.
fn overlap_derivatives(
    basis: &BasisSet,
    context: &EngineContext,
) -> Result<Vec<Array2<f64>>, anyhow::Error> {
    let specifier = IntegralSpecifier::builder()
        .op(Operator::Overlap)
        .deriv_order(1)
        .build()?;
    let map = OneBodyEvaluator::new(basis, basis, &specifier, context).evaluate()?;
    DerivKey::XYZ
        .iter()
        .map(|&key| get_result(&map, &ResultKey::new(Component::None, key, 0)).cloned())
        .collect()
}

impl COMSaverDigester {
    /// Creates a new saver and evaluates the overlap derivatives it needs.
    ///
    /// # Arguments
    ///
    /// * `basis1` - The bra basis set.
    /// * `basis2` - The ket basis set.
    /// * `specifier` - The description of the integrals, which must carry the total mass.
    /// * `context` - The engine context for the overlap derivatives.
    /// * `symmetry` - [`IntegralSymmetry::Twofold`] or, for the same basis set on both sides,
    ///   [`IntegralSymmetry::Fourfold`].
    ///
    /// # Errors
    ///
    /// Errors if the total mass is missing, derivatives are requested, the symmetry is not
    /// supported, or the overlap derivatives cannot be evaluated.
    pub fn new(
        basis1: &BasisSet,
        basis2: &BasisSet,
        specifier: &IntegralSpecifier,
        context: &EngineContext,
        symmetry: IntegralSymmetry,
    ) -> Result<Self, anyhow::Error> {
        ensure!(
            matches!(
                symmetry,
                IntegralSymmetry::Twofold | IntegralSymmetry::Fourfold
            ),
            "Symmetry must be either twofold or fourfold, not {symmetry}."
        );
        let total_mass = specifier
            .total_mass
            .ok_or_else(|| format_err!("No total mass given in integral specifier."))?;
        ensure!(
            specifier.deriv_order == 0,
            "Derivatives of centre-of-mass corrected Coulomb integrals not available."
        );
        let dims = (basis1.n_funcs(), basis2.n_funcs());
        ensure!(
            symmetry != IntegralSymmetry::Fourfold || dims.0 == dims.1,
            "Fourfold symmetry with bra-ket exchange requires basis sets of equal sizes."
        );

        let bra = overlap_derivatives(basis1, context)?;
        let ket = if basis1 == basis2 {
            bra.clone()
        } else {
            overlap_derivatives(basis2, context)?
        };
        let keys = two_body_result_keys(0);
        let results = keys
            .iter()
            .map(|_| Array2::zeros((dims.0 * dims.0, dims.1 * dims.1)))
            .collect();
        Ok(Self {
            symmetry,
            dims,
            scaling: specifier.two_body_scaling(),
            total_mass,
            overlap_derivatives: [bra, ket],
            keys,
            results: Mutex::new(results),
        })
    }

    /// The coupling term $`C_{ijkl}`$.
    fn coupling(&self, [i, j, k, l]: QuartetIndex) -> f64 {
        let [bra, ket] = &self.overlap_derivatives;
        -bra.iter()
            .zip(ket.iter())
            .map(|(sb, sk)| sb[(i, j)] * sk[(k, l)])
            .sum::<f64>()
            / self.total_mass
    }
}

impl Digester for COMSaverDigester {
    type Accumulator = Vec<Array2<f64>>;

    type Output = IntegralEvaluatorMap;

    fn initialize(&mut self, _: usize) {}

    fn bra_ket_symmetric(&self) -> bool {
        self.symmetry == IntegralSymmetry::Fourfold
    }

    fn compute_degeneracy(&self, _: [usize; 4]) -> f64 {
        1.0
    }

    fn with_accumulator<F>(&self, f: F)
    where
        F: FnOnce(&mut Self::Accumulator),
    {
        let mut guard = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }

    fn digest(
        &self,
        accumulator: &mut Self::Accumulator,
        value: f64,
        index: QuartetIndex,
        result_index: usize,
        _: f64,
    ) {
        let coupling = self.coupling(index);
        let value = value * self.scaling;
        let (dim1, dim2) = self.dims;
        let writes: &[(QuartetIndex, f64)] = match self.symmetry {
            IntegralSymmetry::Fourfold => &FOURFOLD_WRITES,
            _ => &TWOFOLD_WRITES,
        };
        for (perm, sign) in writes {
            let [i, j, k, l] = permute(index, *perm);
            accumulator[result_index][(i * dim1 + j, k * dim2 + l)] = value + sign * coupling;
        }
    }

    fn finalize(self) -> Result<Self::Output, anyhow::Error> {
        let results = self
            .results
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(self.keys.into_iter().zip(results).collect())
    }
}
