//! Prescreening of shell quartets before integral evaluation.

use anyhow::{self, ensure};
use ndarray::{s, Array2};

use crate::basis::basis_set::BasisSet;
use crate::integrals::density::DensityMatrix;

/// Decides whether a shell quartet is worth evaluating.
pub trait Prescreener: Sync {
    /// Whether the quartet `(s1 s2 | s3 s4)` is significant.
    ///
    /// # Arguments
    ///
    /// * `shells` - The shell indices `[s1, s2, s3, s4]`.
    /// * `cauchy_schwarz` - The product of the Cauchy–Schwarz factors of the pairs `(s1, s2)`
    ///   and `(s3, s4)`, if both are available.
    fn is_significant(&self, shells: [usize; 4], cauchy_schwarz: Option<f64>) -> bool;
}

/// A prescreener that keeps every quartet.
#[derive(Clone, Copy, Debug, Default)]
pub struct VoidPrescreener;

impl Prescreener for VoidPrescreener {
    fn is_significant(&self, _: [usize; 4], _: Option<f64>) -> bool {
        true
    }
}

/// A prescreener for Fock-matrix builds bounding the contribution of a quartet by its
/// Cauchy–Schwarz factor times the largest density element in the shell blocks it touches.
///
/// The shell-block maxima are computed once at construction, so a new prescreener is needed
/// whenever the density changes.
#[derive(Clone, Debug)]
pub struct CauchySchwarzDensityPrescreener {
    /// $`\max |D_{\mu\nu}|`$ over the functions of every pair of shells.
    block_maxima: Array2<f64>,

    /// The largest absolute density element.
    density_maximum: f64,

    threshold: f64,
}

impl CauchySchwarzDensityPrescreener {
    /// Creates a new prescreener from the total density of `density`.
    ///
    /// # Errors
    ///
    /// Errors if the density does not match the size of `basis`.
    pub fn new(
        basis: &BasisSet,
        density: &DensityMatrix,
        threshold: f64,
    ) -> Result<Self, anyhow::Error> {
        ensure!(
            density.dim() == basis.n_funcs(),
            "The density matrix has dimension {}, but the basis set has {} functions.",
            density.dim(),
            basis.n_funcs()
        );
        let total = density.restricted();
        let n_shells = basis.n_shells();
        let shell_to_bf = basis.shell_to_bf();
        let mut block_maxima = Array2::<f64>::zeros((n_shells, n_shells));
        for s1 in 0..n_shells {
            let bf1 = shell_to_bf[s1];
            let n1 = basis[s1].n_funcs();
            for s2 in 0..=s1 {
                let bf2 = shell_to_bf[s2];
                let n2 = basis[s2].n_funcs();
                let max = total
                    .slice(s![bf1..bf1 + n1, bf2..bf2 + n2])
                    .iter()
                    .fold(0.0_f64, |acc, x| acc.max(x.abs()));
                block_maxima[(s1, s2)] = max;
                block_maxima[(s2, s1)] = max;
            }
        }
        let density_maximum = block_maxima.iter().fold(0.0_f64, |acc, &x| acc.max(x));
        log::debug!(
            "Cauchy–Schwarz density prescreening with threshold {threshold:.3e} and maximum density element {density_maximum:.6e}."
        );
        Ok(Self {
            block_maxima,
            density_maximum,
            threshold,
        })
    }
}

impl Prescreener for CauchySchwarzDensityPrescreener {
    fn is_significant(&self, shells: [usize; 4], cauchy_schwarz: Option<f64>) -> bool {
        let Some(cs) = cauchy_schwarz else {
            return true;
        };
        if (self.density_maximum * cs).abs() < self.threshold {
            return false;
        }
        let [s1, s2, s3, s4] = shells;
        let block_maximum = [(s1, s2), (s1, s3), (s1, s4), (s2, s3), (s2, s4), (s3, s4)]
            .iter()
            .fold(0.0_f64, |acc, &pair| acc.max(self.block_maxima[pair]));
        (block_maximum * cs).abs() > self.threshold
    }
}
