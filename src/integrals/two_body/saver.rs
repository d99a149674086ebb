//! Digesters storing the complete four-index tensor.

use std::sync::{Mutex, PoisonError};

use anyhow::{self, ensure};
use itertools::iproduct;
use ndarray::Array2;

use crate::basis::basis_set::BasisSet;
use crate::integrals::two_body::digester::Digester;
use crate::integrals::two_body::symmetry::{moved_position, permute, IntegralSymmetry, QuartetIndex};
use crate::integrals::{Component, DerivKey, IntegralEvaluatorMap, IntegralSpecifier, ResultKey};

/// The number of shell centres of a two-body integral.
const N_CENTRES: usize = 4;

/// The result keys of a two-body tensor, one per engine buffer row.
pub(crate) fn two_body_result_keys(deriv_order: u32) -> Vec<ResultKey> {
    if deriv_order == 0 {
        vec![ResultKey::value()]
    } else {
        iproduct!(0..N_CENTRES, DerivKey::XYZ)
            .map(|(centre, key)| ResultKey::new(Component::None, key, centre))
            .collect()
    }
}

/// Stores every integral $`(ij|kl)`$ at row `i * nbf1 + j` and column `k * nbf2 + l` of an
/// `nbf1² × nbf2²` matrix, writing each value to all positions related by the chosen
/// symmetry.
///
/// For derivative integrals, the derivative centre follows its function, so every stored entry
/// is the derivative with respect to the centre of the function at that position.
#[derive(Debug)]
pub struct SaverDigester {
    symmetry: IntegralSymmetry,
    dims: (usize, usize),
    scaling: f64,
    deriv_order: u32,
    keys: Vec<ResultKey>,
    results: Mutex<Vec<Array2<f64>>>,
}

impl SaverDigester {
    /// Creates a new saver.
    ///
    /// # Arguments
    ///
    /// * `basis1` - The bra basis set.
    /// * `basis2` - The ket basis set.
    /// * `specifier` - The description of the integrals.
    /// * `symmetry` - [`IntegralSymmetry::Fourfold`] or, for the same basis set on both sides,
    ///   [`IntegralSymmetry::Eightfold`].
    ///
    /// # Errors
    ///
    /// Errors if the symmetry is not supported or eightfold symmetry is requested for basis
    /// sets of different sizes.
    pub fn new(
        basis1: &BasisSet,
        basis2: &BasisSet,
        specifier: &IntegralSpecifier,
        symmetry: IntegralSymmetry,
    ) -> Result<Self, anyhow::Error> {
        ensure!(
            matches!(
                symmetry,
                IntegralSymmetry::Fourfold | IntegralSymmetry::Eightfold
            ),
            "Symmetry must be either fourfold or eightfold, not {symmetry}."
        );
        let dims = (basis1.n_funcs(), basis2.n_funcs());
        ensure!(
            symmetry != IntegralSymmetry::Eightfold || dims.0 == dims.1,
            "Eightfold symmetry requires basis sets of equal sizes."
        );
        let keys = two_body_result_keys(specifier.deriv_order);
        let results = keys
            .iter()
            .map(|_| Array2::zeros((dims.0 * dims.0, dims.1 * dims.1)))
            .collect();
        Ok(Self {
            symmetry,
            dims,
            scaling: specifier.two_body_scaling(),
            deriv_order: specifier.deriv_order,
            keys,
            results: Mutex::new(results),
        })
    }
}

impl Digester for SaverDigester {
    type Accumulator = Vec<Array2<f64>>;

    type Output = IntegralEvaluatorMap;

    fn initialize(&mut self, _: usize) {}

    fn bra_ket_symmetric(&self) -> bool {
        self.symmetry == IntegralSymmetry::Eightfold
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
        let value = value * self.scaling;
        let (dim1, dim2) = self.dims;
        for perm in self.symmetry.permutations() {
            let [i, j, k, l] = permute(index, *perm);
            let row = if self.deriv_order == 0 {
                result_index
            } else {
                moved_position(perm, result_index / 3) * 3 + result_index % 3
            };
            accumulator[row][(i * dim1 + j, k * dim2 + l)] = value;
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
