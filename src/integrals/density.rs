//! Density matrices and spin-resolved matrices of Fock-matrix contributions.

use std::fmt;

use anyhow::{self, ensure};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "density_tests.rs"]
mod density_tests;

/// A one-particle density matrix in the basis-function representation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DensityMatrix {
    /// A single spatial density shared by both spins.
    Restricted(Array2<f64>),

    /// Separate spin densities. The beta block is absent when there are no beta particles.
    Unrestricted {
        alpha: Array2<f64>,
        beta: Option<Array2<f64>>,
    },
}

impl DensityMatrix {
    /// Creates an unrestricted density matrix.
    ///
    /// # Errors
    ///
    /// Errors if a block is not square or the blocks have different shapes.
    pub fn unrestricted(
        alpha: Array2<f64>,
        beta: Option<Array2<f64>>,
    ) -> Result<Self, anyhow::Error> {
        ensure!(
            alpha.nrows() == alpha.ncols(),
            "The alpha density block is not square."
        );
        if let Some(beta) = &beta {
            ensure!(
                beta.dim() == alpha.dim(),
                "The alpha and beta density blocks have different shapes."
            );
        }
        Ok(Self::Unrestricted { alpha, beta })
    }

    /// Whether the density is spin-restricted.
    pub fn is_restricted(&self) -> bool {
        matches!(self, DensityMatrix::Restricted(_))
    }

    /// The number of basis functions.
    pub fn dim(&self) -> usize {
        match self {
            DensityMatrix::Restricted(d) => d.nrows(),
            DensityMatrix::Unrestricted { alpha, .. } => alpha.nrows(),
        }
    }

    /// The total density, summed over both spins for unrestricted densities.
    pub fn restricted(&self) -> Array2<f64> {
        match self {
            DensityMatrix::Restricted(d) => d.clone(),
            DensityMatrix::Unrestricted { alpha, beta } => match beta {
                Some(beta) => alpha + beta,
                None => alpha.clone(),
            },
        }
    }
}

impl fmt::Display for DensityMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DensityMatrix::Restricted(d) => {
                write!(f, "Restricted density matrix ({}×{})", d.nrows(), d.ncols())
            }
            DensityMatrix::Unrestricted { alpha, beta } => write!(
                f,
                "Unrestricted density matrix ({}×{}, {} beta block)",
                alpha.nrows(),
                alpha.ncols(),
                if beta.is_some() { "with" } else { "without" }
            ),
        }
    }
}

/// A matrix with the same spin structure as the density matrix it was built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SpinMatrix {
    Restricted(Array2<f64>),
    Unrestricted {
        alpha: Array2<f64>,
        beta: Option<Array2<f64>>,
    },
}

impl SpinMatrix {
    /// A zero matrix with the spin structure and dimension of `density`.
    pub fn zeros_like(density: &DensityMatrix) -> Self {
        let n = density.dim();
        match density {
            DensityMatrix::Restricted(_) => SpinMatrix::Restricted(Array2::zeros((n, n))),
            DensityMatrix::Unrestricted { beta, .. } => SpinMatrix::Unrestricted {
                alpha: Array2::zeros((n, n)),
                beta: beta.as_ref().map(|_| Array2::zeros((n, n))),
            },
        }
    }

    /// The restricted block, if this is a restricted matrix.
    pub fn restricted(&self) -> Option<&Array2<f64>> {
        match self {
            SpinMatrix::Restricted(m) => Some(m),
            SpinMatrix::Unrestricted { .. } => None,
        }
    }

    /// The alpha block, if this is an unrestricted matrix.
    pub fn alpha(&self) -> Option<&Array2<f64>> {
        match self {
            SpinMatrix::Restricted(_) => None,
            SpinMatrix::Unrestricted { alpha, .. } => Some(alpha),
        }
    }

    /// The beta block, if this is an unrestricted matrix with beta particles.
    pub fn beta(&self) -> Option<&Array2<f64>> {
        match self {
            SpinMatrix::Restricted(_) => None,
            SpinMatrix::Unrestricted { beta, .. } => beta.as_ref(),
        }
    }

    /// Replaces every block $`\mathbf{M}`$ by $`\tfrac{1}{2}(\mathbf{M} + \mathbf{M}^{\mathsf{T}})`$.
    pub fn symmetrise(&mut self) {
        self.blocks_mut().into_iter().for_each(|m| {
            let sym = (&*m + &m.t()) * 0.5;
            *m = sym;
        });
    }

    /// Adds the blocks of `other` to the blocks of `self`.
    ///
    /// # Errors
    ///
    /// Errors if the two matrices differ in spin structure, in the presence of a beta block, or
    /// in dimension. `self` is left unchanged in that case.
    pub fn add_assign(&mut self, other: &SpinMatrix) -> Result<(), anyhow::Error> {
        let shapes = |m: &SpinMatrix| match m {
            SpinMatrix::Restricted(r) => (false, r.dim(), None),
            SpinMatrix::Unrestricted { alpha, beta } => {
                (true, alpha.dim(), beta.as_ref().map(|b| b.dim()))
            }
        };
        ensure!(
            shapes(self) == shapes(other),
            "Cannot add spin matrices of different spin structures or dimensions."
        );
        self.blocks_mut()
            .into_iter()
            .zip(other.blocks())
            .for_each(|(a, b)| *a += b);
        Ok(())
    }

    fn blocks(&self) -> Vec<&Array2<f64>> {
        match self {
            SpinMatrix::Restricted(m) => vec![m],
            SpinMatrix::Unrestricted { alpha, beta } => {
                let mut blocks = vec![alpha];
                if let Some(beta) = beta {
                    blocks.push(beta);
                }
                blocks
            }
        }
    }

    fn blocks_mut(&mut self) -> Vec<&mut Array2<f64>> {
        match self {
            SpinMatrix::Restricted(m) => vec![m],
            SpinMatrix::Unrestricted { alpha, beta } => {
                let mut blocks = vec![alpha];
                if let Some(beta) = beta {
                    blocks.push(beta);
                }
                blocks
            }
        }
    }
}
