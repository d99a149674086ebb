//! Screened shell-pair lists.

use std::ops::Index;

use anyhow::{self, ensure};
use log;
use rayon::prelude::*;

use crate::basis::basis_set::BasisSet;
use crate::integrals::engine::{
    Engine, EngineContext, EngineOperator, EngineShell, ShellPairIntermediates,
};

#[cfg(test)]
#[path = "shell_pairs_tests.rs"]
mod shell_pairs_tests;

/// Default threshold on the Frobenius norm of the overlap block of a shell pair.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 1e-12;

/// One entry of the pair list of a shell.
#[derive(Clone, Debug)]
pub struct ShellPairData {
    /// The index of the partner shell, not larger than the index of the owning shell.
    pub partner: usize,

    /// Primitive-pair intermediates of the ordered pair (owner, partner).
    pub intermediates: ShellPairIntermediates,

    /// The Cauchy–Schwarz factor $`\sqrt{\max |(ab|ab)|}`$, if computed.
    pub cauchy_schwarz: Option<f64>,
}

/// Per-shell lists of significant partner shells with index not larger than the owner.
#[derive(Clone, Debug)]
pub struct ShellPairs {
    pairs: Vec<Vec<ShellPairData>>,
    has_cauchy_schwarz: bool,
}

impl ShellPairs {
    /// Builds the shell pairs of a basis set.
    ///
    /// # Arguments
    ///
    /// * `basis` - The basis set.
    /// * `context` - The engine context, which must support the highest angular momentum of
    ///   `basis`.
    /// * `overlap_screening` - If `true`, pairs on different centres whose overlap block has a
    ///   Frobenius norm not above `threshold` are dropped.
    /// * `threshold` - The overlap screening threshold.
    /// * `cauchy_schwarz` - If `true`, the Cauchy–Schwarz factor of every retained pair is
    ///   computed.
    ///
    /// # Errors
    ///
    /// Errors if the engine context is too small for the basis set or an engine call fails.
    pub fn build(
        basis: &BasisSet,
        context: &EngineContext,
        overlap_screening: bool,
        threshold: f64,
        cauchy_schwarz: bool,
    ) -> Result<Self, anyhow::Error> {
        ensure!(
            context.max_l() >= basis.max_l(),
            "Engine context supports angular momenta up to {}, but the basis set requires {}.",
            context.max_l(),
            basis.max_l()
        );
        let shells = basis.engine_shells();
        let overlap = Engine::new(context, EngineOperator::Overlap, 0)?;
        let coulomb = Engine::new(context, EngineOperator::Coulomb, 0)?.with_precision(0.0);
        let ln_precision = overlap.ln_precision();

        let mut pairs = (0..shells.len())
            .into_par_iter()
            .map(|s1| {
                (0..=s1)
                    .filter_map(|s2| {
                        significant_pair(
                            &shells[s1],
                            &shells[s2],
                            &overlap,
                            overlap_screening,
                            threshold,
                        )
                        .map(|significant| significant.then_some(s2))
                        .transpose()
                    })
                    .map(|s2| {
                        let s2 = s2?;
                        let intermediates =
                            ShellPairIntermediates::new(&shells[s1], &shells[s2], ln_precision);
                        let cs = if cauchy_schwarz {
                            Some(cauchy_schwarz_factor(
                                &shells[s1],
                                &shells[s2],
                                &intermediates,
                                &coulomb,
                            )?)
                        } else {
                            None
                        };
                        Ok(ShellPairData {
                            partner: s2,
                            intermediates,
                            cauchy_schwarz: cs,
                        })
                    })
                    .collect::<Result<Vec<_>, anyhow::Error>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        pairs
            .iter_mut()
            .for_each(|list| list.sort_by_key(|pair| pair.partner));

        log::debug!(
            "Built {} significant shell pairs out of {} for {} shells.",
            pairs.iter().map(Vec::len).sum::<usize>(),
            shells.len() * (shells.len() + 1) / 2,
            shells.len()
        );
        Ok(Self {
            pairs,
            has_cauchy_schwarz: cauchy_schwarz,
        })
    }

    /// Whether Cauchy–Schwarz factors are available.
    pub fn has_cauchy_schwarz(&self) -> bool {
        self.has_cauchy_schwarz
    }

    /// The number of shells covered.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no shells.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The total number of retained pairs.
    pub fn n_pairs(&self) -> usize {
        self.pairs.iter().map(Vec::len).sum()
    }
}

impl Index<usize> for ShellPairs {
    type Output = [ShellPairData];

    fn index(&self, s: usize) -> &Self::Output {
        &self.pairs[s]
    }
}

/// Decides whether a shell pair is kept in the pair list.
fn significant_pair(
    a: &EngineShell,
    b: &EngineShell,
    overlap: &Engine,
    overlap_screening: bool,
    threshold: f64,
) -> Result<bool, anyhow::Error> {
    if a.origin == b.origin || !overlap_screening {
        return Ok(true);
    }
    let norm = overlap
        .compute1(a, b)?
        .map(|block| block.iter().map(|x| x * x).sum::<f64>().sqrt())
        .unwrap_or(0.0);
    Ok(norm > threshold)
}

/// $`\sqrt{\max |(ab|ab)|}`$ with all primitive screening disabled.
fn cauchy_schwarz_factor(
    a: &EngineShell,
    b: &EngineShell,
    intermediates: &ShellPairIntermediates,
    coulomb: &Engine,
) -> Result<f64, anyhow::Error> {
    let max = coulomb
        .compute2(a, b, a, b, Some(intermediates), Some(intermediates))?
        .map(|block| block.iter().fold(0.0_f64, |acc, x| acc.max(x.abs())))
        .unwrap_or(0.0);
    Ok(max.sqrt())
}
