//! Evaluation of one-body integral matrices.

use anyhow::{self, bail, ensure, format_err};
use itertools::{iproduct, Itertools};
use ndarray::{s, Array2};
use rayon::prelude::*;

use crate::basis::basis_set::BasisSet;
use crate::integrals::engine::{point_charges_from_atoms, Engine, EngineContext, EngineOperator};
use crate::integrals::{
    Component, DerivKey, IntegralEvaluatorMap, IntegralSpecifier, Operator, ResultKey,
};

#[cfg(test)]
#[path = "one_body_tests.rs"]
mod one_body_tests;

/// An evaluator of the one-body integrals $`\langle a | \hat{O} | b \rangle`$ between the
/// functions of two basis sets.
///
/// Every shell pair of the two basis sets is computed. No permutational symmetry is assumed.
pub struct OneBodyEvaluator<'a> {
    basis1: &'a BasisSet,
    basis2: &'a BasisSet,
    specifier: &'a IntegralSpecifier,
    context: &'a EngineContext,
}

impl<'a> OneBodyEvaluator<'a> {
    /// Creates a new one-body evaluator.
    ///
    /// # Arguments
    ///
    /// * `basis1` - The bra basis set.
    /// * `basis2` - The ket basis set.
    /// * `specifier` - The description of the integrals.
    /// * `context` - The engine context, which must cover both basis sets.
    pub fn new(
        basis1: &'a BasisSet,
        basis2: &'a BasisSet,
        specifier: &'a IntegralSpecifier,
        context: &'a EngineContext,
    ) -> Self {
        Self {
            basis1,
            basis2,
            specifier,
            context,
        }
    }

    /// The engine operator and the physical scaling of the requested operator.
    fn engine_operator(&self) -> Result<(EngineOperator, f64), anyhow::Error> {
        let particle = self.specifier.first_type();
        match self.specifier.op {
            Operator::Overlap => Ok((EngineOperator::Overlap, 1.0)),
            Operator::Kinetic => Ok((EngineOperator::Kinetic, particle.mass.recip())),
            Operator::KineticCOM => {
                let total_mass = self
                    .specifier
                    .total_mass
                    .ok_or_else(|| format_err!("No total mass given in integral specifier."))?;
                Ok((
                    EngineOperator::Kinetic,
                    particle.mass.recip() - total_mass.recip(),
                ))
            }
            Operator::PointCharges => {
                let atoms = self
                    .specifier
                    .atoms
                    .as_ref()
                    .ok_or_else(|| format_err!("No atoms given in integral specifier."))?;
                Ok((
                    EngineOperator::Nuclear(point_charges_from_atoms(atoms)),
                    particle.charge_scaling(),
                ))
            }
            Operator::Dipole => {
                let origin = self.specifier.multipole_origin.ok_or_else(|| {
                    format_err!("No multipole origin given in integral specifier.")
                })?;
                Ok((
                    EngineOperator::Dipole([origin.x, origin.y, origin.z]),
                    particle.charge_scaling(),
                ))
            }
            op @ (Operator::Coulomb | Operator::CoulombCOM) => {
                bail!("Operator `{op}` is not a one-body operator.")
            }
        }
    }

    /// Evaluates the integrals.
    ///
    /// # Returns
    ///
    /// A map with one `nbf1 × nbf2` matrix per operator component, derivative centre and
    /// derivative direction. Derivative centres are the bra centre (0), the ket centre (1) and,
    /// for point-charge attraction, every point charge in order (2, 3, ...).
    ///
    /// # Errors
    ///
    /// Errors if the operator is not a one-body operator, the data the operator needs is
    /// missing from the specifier, or the engine context is too small.
    pub fn evaluate(&self) -> Result<IntegralEvaluatorMap, anyhow::Error> {
        let (operator, scaling) = self.engine_operator()?;
        let max_l = self.basis1.max_l().max(self.basis2.max_l());
        ensure!(
            self.context.max_l() >= max_l,
            "Engine context supports angular momenta up to {}, but the basis sets require {max_l}.",
            self.context.max_l()
        );
        let components = if matches!(operator, EngineOperator::Dipole(_)) {
            Component::XYZ.to_vec()
        } else {
            vec![Component::None]
        };
        let engine = Engine::new(self.context, operator, self.specifier.deriv_order)?;
        let deriv_keys = DerivKey::for_order(self.specifier.deriv_order);
        let n_centres = engine.n_centres_one_body();

        // Row `r` of an engine block belongs to `keys[r]`.
        let keys = iproduct!(components.iter(), 0..n_centres, deriv_keys.iter())
            .map(|(&component, centre, &deriv_key)| ResultKey::new(component, deriv_key, centre))
            .collect_vec();
        let nbf1 = self.basis1.n_funcs();
        let nbf2 = self.basis2.n_funcs();
        let mut result = keys
            .iter()
            .map(|key| (*key, Array2::<f64>::zeros((nbf1, nbf2))))
            .collect::<IntegralEvaluatorMap>();

        let shells1 = self.basis1.engine_shells();
        let shells2 = self.basis2.engine_shells();
        let blocks = (0..shells1.len())
            .into_par_iter()
            .map(|s1| {
                (0..shells2.len())
                    .filter_map(|s2| {
                        engine
                            .compute1(&shells1[s1], &shells2[s2])
                            .map(|block| block.map(|block| (s1, s2, block)))
                            .transpose()
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let shell_to_bf1 = self.basis1.shell_to_bf();
        let shell_to_bf2 = self.basis2.shell_to_bf();
        for (s1, s2, block) in blocks.into_iter().flatten() {
            let n1 = self.basis1[s1].n_funcs();
            let n2 = self.basis2[s2].n_funcs();
            let bf1 = shell_to_bf1[s1];
            let bf2 = shell_to_bf2[s2];
            for (key, row) in keys.iter().zip(block.rows()) {
                let row = row
                    .into_shape((n1, n2))
                    .map_err(|err| format_err!("Unexpected engine block shape: {err}."))?;
                result
                    .get_mut(key)
                    .ok_or_else(|| format_err!("No result matrix for key {key}."))?
                    .slice_mut(s![bf1..bf1 + n1, bf2..bf2 + n2])
                    .assign(&(&row * scaling));
            }
        }
        log::debug!(
            "Evaluated {} one-body integrals over {}×{} basis functions ({} result matrices).",
            self.specifier.op,
            nbf1,
            nbf2,
            result.len()
        );
        Ok(result)
    }
}
