//! Driver for evaluating a list of integral jobs over one molecule and basis set.

use std::fmt;
use std::path::PathBuf;

use anyhow::{self, format_err};
use derive_builder::Builder;
use itertools::Itertools;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::auxiliary::molecule::Molecule;
use crate::basis::basis_set::BasisSet;
use crate::drivers::integral_service::{BasisSetName, IntegralEvaluatorSettings, IntegralService};
use crate::drivers::MolintDriver;
use crate::integrals::{IntegralEvaluatorMap, IntegralSpecifier, Operator, ParticleType};
use crate::io::format::{
    log_subtitle, molint_output, nice_bool, write_subtitle, write_title, MolintOutput,
};
use crate::io::{write_molint_binary, MolintFileType};

#[cfg(test)]
#[path = "integral_evaluation_tests.rs"]
mod integral_evaluation_tests;

// ==================
// Struct definitions
// ==================

// ---
// Job
// ---

fn default_particle_types() -> Vec<ParticleType> {
    vec![ParticleType::electron()]
}

/// One integral evaluation requested from the driver.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegralJob {
    /// The operator.
    pub op: Operator,

    /// The derivative order, zero or one.
    #[builder(default = "0")]
    #[serde(default)]
    pub deriv_order: u32,

    /// The multipole origin in bohr for dipole integrals.
    #[builder(default = "None")]
    #[serde(default)]
    pub multipole_origin: Option<[f64; 3]>,

    /// The total mass in electron masses for centre-of-mass corrected operators.
    #[builder(default = "None")]
    #[serde(default)]
    pub total_mass: Option<f64>,

    /// The particle types of the bra and ket functions.
    #[builder(default = "default_particle_types()")]
    #[serde(default = "default_particle_types")]
    pub particle_types: Vec<ParticleType>,

    /// The name of the binary file to write the result map into, without its extension.
    #[builder(default = "None")]
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl IntegralJob {
    /// Returns a builder to construct a new [`IntegralJob`].
    pub fn builder() -> IntegralJobBuilder {
        IntegralJobBuilder::default()
    }

    /// The integral specifier of this job. The nuclei of `molecule` act as point charges.
    fn specifier(&self, molecule: &Molecule) -> IntegralSpecifier {
        IntegralSpecifier {
            op: self.op,
            deriv_order: self.deriv_order,
            atoms: Some(molecule.atoms.clone()),
            multipole_origin: self.multipole_origin.map(Point3::from),
            total_mass: self.total_mass,
            type_vector: self.particle_types.clone(),
        }
    }
}

impl fmt::Display for IntegralJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (derivative order {})", self.op, self.deriv_order)?;
        if let Some(origin) = self.multipole_origin {
            write!(
                f,
                ", origin ({})",
                origin.iter().map(|x| format!("{x:+.3}")).join(", ")
            )?;
        }
        if let Some(mass) = self.total_mass {
            write!(f, ", total mass {mass:.3}")?;
        }
        if self.particle_types.len() > 1 || self.particle_types != default_particle_types() {
            write!(
                f,
                ", particles {}",
                self.particle_types.iter().map(|p| p.symbol.as_str()).join("/")
            )?;
        }
        Ok(())
    }
}

// ----------
// Parameters
// ----------

/// Parameters of the integral evaluation driver, deserialisable from the YAML input file.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegralEvaluationParams {
    /// The path to the `xyz` file of the molecule.
    pub xyz: PathBuf,

    /// The basis set.
    pub basis: BasisSetName,

    /// The settings of the integral service.
    #[builder(default)]
    #[serde(default)]
    pub settings: IntegralEvaluatorSettings,

    /// The jobs, evaluated in order.
    #[builder(default)]
    #[serde(default)]
    pub jobs: Vec<IntegralJob>,
}

impl IntegralEvaluationParams {
    /// Returns a builder to construct a new [`IntegralEvaluationParams`].
    pub fn builder() -> IntegralEvaluationParamsBuilder {
        IntegralEvaluationParamsBuilder::default()
    }
}

impl fmt::Display for IntegralEvaluationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_title(f, "Integral Evaluation")?;
        writeln!(f)?;
        writeln!(f, "Geometry: {}", self.xyz.display())?;
        writeln!(f, "Basis set: {}", self.basis)?;
        write!(f, "{}", self.settings)?;
        writeln!(f)?;
        write_subtitle(f, "Jobs")?;
        for (i, job) in self.jobs.iter().enumerate() {
            writeln!(f, "  {:>3}: {job}", i + 1)?;
        }
        writeln!(f)?;
        Ok(())
    }
}

// ------
// Result
// ------

/// The outcome of one job.
#[derive(Clone, Debug)]
pub struct IntegralJobResult {
    /// The job.
    pub job: IntegralJob,

    /// The result matrices.
    pub map: IntegralEvaluatorMap,
}

impl IntegralJobResult {
    /// The largest absolute entry over all result matrices.
    fn max_abs(&self) -> f64 {
        self.map
            .values()
            .flat_map(|m| m.iter())
            .fold(0.0_f64, |acc, x| acc.max(x.abs()))
    }
}

/// The outcome of the integral evaluation driver.
#[derive(Clone, Debug)]
pub struct IntegralEvaluationResult {
    /// The basis set the integrals were evaluated over.
    pub basis: BasisSet,

    /// One result per job, in job order.
    pub jobs: Vec<IntegralJobResult>,
}

impl fmt::Display for IntegralEvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "┈".repeat(78);
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:>3} {:>12} {:>6} {:>9} {:>15} {:>13} {:>13}",
            "#", "Operator", "Deriv", "Matrices", "Shape", "Max |value|", "Written"
        )?;
        writeln!(f, "{rule}")?;
        for (i, result) in self.jobs.iter().enumerate() {
            let shape = result
                .map
                .values()
                .next()
                .map(|m| format!("{}×{}", m.nrows(), m.ncols()))
                .unwrap_or_else(|| "--".to_string());
            writeln!(
                f,
                "{:>3} {:>12} {:>6} {:>9} {:>15} {:>13.6e} {:>13}",
                i + 1,
                result.job.op.to_string(),
                result.job.deriv_order,
                result.map.len(),
                shape,
                result.max_abs(),
                nice_bool(result.job.output.is_some())
            )?;
        }
        writeln!(f, "{rule}")?;
        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver evaluating integral jobs over a molecule read from an `xyz` file or given directly.
#[derive(Clone, Builder)]
pub struct IntegralEvaluationDriver<'a> {
    parameters: &'a IntegralEvaluationParams,

    #[builder(default = "None")]
    molecule: Option<&'a Molecule>,

    #[builder(default = "None")]
    result: Option<IntegralEvaluationResult>,
}

impl<'a> IntegralEvaluationDriver<'a> {
    /// Returns a builder to construct a new [`IntegralEvaluationDriver`].
    pub fn builder() -> IntegralEvaluationDriverBuilder<'a> {
        IntegralEvaluationDriverBuilder::default()
    }

    fn evaluate_integrals(&mut self) -> Result<(), anyhow::Error> {
        let params = self.parameters;
        params.log_output_display();

        let owned_molecule;
        let molecule = match self.molecule {
            Some(molecule) => molecule,
            None => {
                owned_molecule = Molecule::from_xyz(&params.xyz)?;
                &owned_molecule
            }
        };

        let service = IntegralService::new(params.settings.clone());
        let basis = service.build_basis(&params.basis, &molecule.atoms, true)?;
        log_subtitle("Basis set");
        molint_output!("");
        basis.log_output_display();
        molint_output!("");

        let jobs = params
            .jobs
            .iter()
            .map(|job| {
                let specifier = job.specifier(molecule);
                let map = service.evaluate(&specifier, &basis, &basis)?;
                if let Some(name) = job.output.as_ref() {
                    write_molint_binary(name, MolintFileType::Ints, &map)?;
                    log::debug!("Wrote {} result matrices to {}.", map.len(), name.display());
                }
                Ok(IntegralJobResult {
                    job: job.clone(),
                    map,
                })
            })
            .collect::<Result<Vec<_>, anyhow::Error>>()?;

        let result = IntegralEvaluationResult { basis, jobs };
        log_subtitle("Summary");
        molint_output!("");
        result.log_output_display();
        molint_output!("");
        self.result = Some(result);
        Ok(())
    }
}

impl<'a> MolintDriver for IntegralEvaluationDriver<'a> {
    type Params = IntegralEvaluationParams;

    type Outcome = IntegralEvaluationResult;

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.evaluate_integrals()
    }

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No integral evaluation results found."))
    }
}
