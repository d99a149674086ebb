//! The top-level service building basis sets and dispatching integral evaluations.

use std::fmt;

use anyhow::{self, bail, ensure};
use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::auxiliary::atom::Atom;
use crate::basis::basis_set::BasisSet;
use crate::basis::shell_pairs::{ShellPairs, DEFAULT_OVERLAP_THRESHOLD};
use crate::integrals::density::DensityMatrix;
use crate::integrals::engine::EngineContext;
use crate::integrals::one_body::OneBodyEvaluator;
use crate::integrals::two_body::com_saver::COMSaverDigester;
use crate::integrals::two_body::coulomb_exchange::{CoulombExchange, CoulombExchangeDigester};
use crate::integrals::two_body::digester::Digester;
use crate::integrals::two_body::evaluator::TwoBodyEvaluator;
use crate::integrals::two_body::prescreener::{
    CauchySchwarzDensityPrescreener, Prescreener, VoidPrescreener,
};
use crate::integrals::two_body::saver::SaverDigester;
use crate::integrals::two_body::symmetry::IntegralSymmetry;
use crate::integrals::two_body::two_type_coulomb::{TwoTypeCoulomb, TwoTypeCoulombDigester};
use crate::integrals::{IntegralEvaluatorMap, IntegralSpecifier, Operator};
use crate::io::format::nice_bool;

#[cfg(test)]
#[path = "integral_service_tests.rs"]
mod integral_service_tests;

// ========
// Settings
// ========

fn default_true() -> bool {
    true
}

/// Settings of the integral service.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegralEvaluatorSettings {
    /// Whether shells with $`l \geq 2`$ consist of real solid harmonics rather than Cartesian
    /// functions.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub use_pure_spherical: bool,
}

impl IntegralEvaluatorSettings {
    /// Returns a builder to construct a new [`IntegralEvaluatorSettings`].
    pub fn builder() -> IntegralEvaluatorSettingsBuilder {
        IntegralEvaluatorSettingsBuilder::default()
    }
}

impl Default for IntegralEvaluatorSettings {
    fn default() -> Self {
        Self {
            use_pure_spherical: true,
        }
    }
}

impl fmt::Display for IntegralEvaluatorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Use pure spherical functions: {}",
            nice_bool(self.use_pure_spherical)
        )
    }
}

// ============
// BasisSetName
// ============

/// The basis set to use, either for every atom or per element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BasisSetName {
    /// One basis set for all atoms.
    Uniform(String),

    /// A basis set for each element, applied group by group in the order given.
    PerElement(IndexMap<String, String>),
}

impl fmt::Display for BasisSetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisSetName::Uniform(name) => write!(f, "{name}"),
            BasisSetName::PerElement(names) => write!(
                f,
                "{}",
                names
                    .iter()
                    .map(|(element, name)| format!("{element}: {name}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

// ===============
// IntegralService
// ===============

/// Builds basis sets and evaluates one-body and two-body integrals over them.
///
/// Every evaluation creates its own [`EngineContext`] sized for the basis sets involved.
#[derive(Clone, Debug, Default)]
pub struct IntegralService {
    settings: IntegralEvaluatorSettings,
}

impl IntegralService {
    /// Creates a new integral service.
    pub fn new(settings: IntegralEvaluatorSettings) -> Self {
        Self { settings }
    }

    /// The settings of this service.
    pub fn settings(&self) -> &IntegralEvaluatorSettings {
        &self.settings
    }

    /// Mutable access to the settings of this service.
    pub fn settings_mut(&mut self) -> &mut IntegralEvaluatorSettings {
        &mut self.settings
    }

    /// Builds a basis set over `atoms`.
    ///
    /// # Arguments
    ///
    /// * `name` - The basis set for all atoms or for each element.
    /// * `atoms` - The atoms, with coordinates in bohr.
    /// * `build_pairs` - If `true`, the shell pairs are built with overlap screening at the
    ///   default threshold and with Cauchy–Schwarz factors.
    ///
    /// # Errors
    ///
    /// Errors if the basis set is unknown, an element of a per-element map does not occur in
    /// `atoms`, or the shell pairs cannot be built.
    pub fn build_basis(
        &self,
        name: &BasisSetName,
        atoms: &[Atom],
        build_pairs: bool,
    ) -> Result<BasisSet, anyhow::Error> {
        let pure = self.settings.use_pure_spherical;
        let mut basis = match name {
            BasisSetName::Uniform(name) => BasisSet::from_library(name, atoms, pure)?,
            BasisSetName::PerElement(names) => BasisSet::from_element_map(names, atoms, pure)?,
        };
        log::debug!(
            "Built basis set `{name}` with {} shells and {} functions.",
            basis.n_shells(),
            basis.n_funcs()
        );
        if build_pairs {
            Self::build_shell_pairs(&mut basis, true, DEFAULT_OVERLAP_THRESHOLD, true)?;
        }
        Ok(basis)
    }

    /// Builds the shell pairs of `basis`. Nothing is done if shell pairs already exist.
    ///
    /// # Arguments
    ///
    /// * `basis` - The basis set.
    /// * `overlap_screening` - Whether to drop pairs of negligible overlap.
    /// * `threshold` - The overlap screening threshold.
    /// * `cauchy_schwarz` - Whether to compute Cauchy–Schwarz factors.
    pub fn build_shell_pairs(
        basis: &mut BasisSet,
        overlap_screening: bool,
        threshold: f64,
        cauchy_schwarz: bool,
    ) -> Result<(), anyhow::Error> {
        if basis.are_shell_pairs_evaluated() {
            log::info!("Shell pairs already evaluated. Nothing was done.");
            return Ok(());
        }
        let context = EngineContext::new(basis.max_l());
        let pairs = ShellPairs::build(basis, &context, overlap_screening, threshold, cauchy_schwarz)?;
        basis.set_shell_pairs(pairs);
        Ok(())
    }

    /// Evaluates the integrals described by `specifier` between `basis1` and `basis2`.
    ///
    /// One-body operators give `nbf1 × nbf2` matrices. Two-body operators give
    /// `nbf1² × nbf2²` matrices with $`(ij|kl)`$ at row `i * nbf1 + j` and column
    /// `k * nbf2 + l`, and need shell pairs on both basis sets.
    ///
    /// # Errors
    ///
    /// Errors if the specifier lacks data the operator needs or two-body integrals are requested
    /// without shell pairs.
    pub fn evaluate(
        &self,
        specifier: &IntegralSpecifier,
        basis1: &BasisSet,
        basis2: &BasisSet,
    ) -> Result<IntegralEvaluatorMap, anyhow::Error> {
        let context = context_for(basis1, basis2);
        if specifier.op.is_two_body() {
            evaluate_two_body(specifier, basis1, basis2, &context)
        } else {
            OneBodyEvaluator::new(basis1, basis2, specifier, &context).evaluate()
        }
    }

    /// Builds Coulomb and exchange matrices directly from a density.
    ///
    /// Shell quartets are prescreened with Cauchy–Schwarz factors and density maxima when the
    /// two basis sets are equal and carry Cauchy–Schwarz factors.
    ///
    /// # Arguments
    ///
    /// * `specifier` - The description of the integrals.
    /// * `basis1` - The bra basis set.
    /// * `basis2` - The ket basis set, which must equal `basis1`.
    /// * `density` - The density matrix.
    /// * `prescreen_threshold` - The prescreening threshold.
    ///
    /// # Errors
    ///
    /// Errors if derivatives are requested, the basis sets differ, shell pairs are missing, or
    /// the density does not match the basis set.
    pub fn evaluate_fock_direct(
        &self,
        specifier: &IntegralSpecifier,
        basis1: &BasisSet,
        basis2: &BasisSet,
        density: &DensityMatrix,
        prescreen_threshold: f64,
    ) -> Result<CoulombExchange, anyhow::Error> {
        let context = context_for(basis1, basis2);
        let digester = CoulombExchangeDigester::new(basis1, basis2, specifier, density)?;
        let use_cauchy_schwarz = basis1 == basis2
            && basis1
                .shell_pairs()
                .map(ShellPairs::has_cauchy_schwarz)
                .unwrap_or(false);
        if use_cauchy_schwarz {
            let prescreener =
                CauchySchwarzDensityPrescreener::new(basis1, density, prescreen_threshold)?;
            run_two_body(specifier, basis1, basis2, &context, digester, prescreener)
        } else {
            run_two_body(specifier, basis1, basis2, &context, digester, VoidPrescreener)
        }
    }

    /// Builds the Coulomb matrices between two different particle types directly from their
    /// densities.
    ///
    /// # Errors
    ///
    /// Errors if the specifier does not name two different particle types, derivatives are
    /// requested, shell pairs are missing, or a density does not match its basis set.
    pub fn evaluate_two_type_direct(
        &self,
        specifier: &IntegralSpecifier,
        basis1: &BasisSet,
        basis2: &BasisSet,
        density1: &DensityMatrix,
        density2: &DensityMatrix,
    ) -> Result<TwoTypeCoulomb, anyhow::Error> {
        ensure!(
            specifier.type_vector.len() >= 2
                && specifier.type_vector[0].symbol != specifier.type_vector[1].symbol,
            "Both particle types are identical; use the Coulomb/exchange path instead."
        );
        let context = context_for(basis1, basis2);
        let digester =
            TwoTypeCoulombDigester::new(basis1, basis2, specifier, density1, density2)?;
        run_two_body(specifier, basis1, basis2, &context, digester, VoidPrescreener)
    }
}

fn context_for(basis1: &BasisSet, basis2: &BasisSet) -> EngineContext {
    EngineContext::new(basis1.max_l().max(basis2.max_l()))
}

fn run_two_body<D, P>(
    specifier: &IntegralSpecifier,
    basis1: &BasisSet,
    basis2: &BasisSet,
    context: &EngineContext,
    digester: D,
    prescreener: P,
) -> Result<D::Output, anyhow::Error>
where
    D: Digester,
    P: Prescreener,
{
    TwoBodyEvaluator::new(basis1, basis2, specifier, context, digester, prescreener).evaluate()
}

/// Stores the full tensor with the highest symmetry the two basis sets allow.
fn evaluate_two_body(
    specifier: &IntegralSpecifier,
    basis1: &BasisSet,
    basis2: &BasisSet,
    context: &EngineContext,
) -> Result<IntegralEvaluatorMap, anyhow::Error> {
    let same_basis = basis1 == basis2;
    match specifier.op {
        Operator::Coulomb => {
            let symmetry = if same_basis {
                IntegralSymmetry::Eightfold
            } else {
                IntegralSymmetry::Fourfold
            };
            let digester = SaverDigester::new(basis1, basis2, specifier, symmetry)?;
            run_two_body(specifier, basis1, basis2, context, digester, VoidPrescreener)
        }
        Operator::CoulombCOM => {
            let symmetry = if same_basis {
                IntegralSymmetry::Fourfold
            } else {
                IntegralSymmetry::Twofold
            };
            let digester = COMSaverDigester::new(basis1, basis2, specifier, context, symmetry)?;
            run_two_body(specifier, basis1, basis2, context, digester, VoidPrescreener)
        }
        op => bail!("Invalid two-body operator `{op}`."),
    }
}
