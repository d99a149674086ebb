//! The parallel traversal of shell quartets.

use anyhow::{self, ensure, format_err};
use rayon::prelude::*;

use crate::basis::basis_set::BasisSet;
use crate::integrals::engine::{Engine, EngineContext, EngineOperator};
use crate::integrals::two_body::digester::{Digester, ShellQuartet};
use crate::integrals::two_body::prescreener::Prescreener;
use crate::integrals::IntegralSpecifier;

/// An evaluator of two-body Coulomb integrals $`(ij|kl)`$ with the bra functions from one basis
/// set and the ket functions from another.
///
/// The shell quartets are visited in parallel over the first shell. Every quartet that passes
/// the prescreener is computed once and handed to the digester, which decides what to make of
/// it. When the two basis sets are equal and the digester allows it, only quartets with
/// `(s3, s4) <= (s1, s2)` are visited.
pub struct TwoBodyEvaluator<'a, D, P>
where
    D: Digester,
    P: Prescreener,
{
    basis1: &'a BasisSet,
    basis2: &'a BasisSet,
    specifier: &'a IntegralSpecifier,
    context: &'a EngineContext,
    digester: D,
    prescreener: P,
}

impl<'a, D, P> TwoBodyEvaluator<'a, D, P>
where
    D: Digester,
    P: Prescreener,
{
    /// Creates a new two-body evaluator.
    ///
    /// # Arguments
    ///
    /// * `basis1` - The bra basis set, with shell pairs evaluated.
    /// * `basis2` - The ket basis set, with shell pairs evaluated.
    /// * `specifier` - The description of the integrals.
    /// * `context` - The engine context, which must cover both basis sets.
    /// * `digester` - The digester receiving the integrals.
    /// * `prescreener` - The prescreener selecting the quartets to compute.
    pub fn new(
        basis1: &'a BasisSet,
        basis2: &'a BasisSet,
        specifier: &'a IntegralSpecifier,
        context: &'a EngineContext,
        digester: D,
        prescreener: P,
    ) -> Self {
        Self {
            basis1,
            basis2,
            specifier,
            context,
            digester,
            prescreener,
        }
    }

    /// Evaluates the integrals and returns what the digester made of them.
    ///
    /// # Errors
    ///
    /// Errors if either basis set lacks shell pairs, the engine context is too small, or an
    /// engine call fails.
    pub fn evaluate(self) -> Result<D::Output, anyhow::Error> {
        let (pairs1, pairs2) = self
            .basis1
            .shell_pairs()
            .zip(self.basis2.shell_pairs())
            .ok_or_else(|| {
                format_err!(
                    "Evaluate shell pairs before performing the two-body integral evaluation!"
                )
            })?;
        let max_l = self.basis1.max_l().max(self.basis2.max_l());
        ensure!(
            self.context.max_l() >= max_l,
            "Engine context supports angular momenta up to {}, but the basis sets require {max_l}.",
            self.context.max_l()
        );

        let mut digester = self.digester;
        digester.initialize(rayon::current_num_threads());
        let engine = Engine::new(
            self.context,
            EngineOperator::Coulomb,
            self.specifier.deriv_order,
        )?;
        let reduce = self.basis1 == self.basis2 && digester.bra_ket_symmetric();

        let shells1 = self.basis1.engine_shells();
        let shells2 = self.basis2.engine_shells();
        let shell_to_bf1 = self.basis1.shell_to_bf();
        let shell_to_bf2 = self.basis2.shell_to_bf();
        let prescreener = &self.prescreener;
        let digester_ref = &digester;

        let n_quartets = (0..pairs1.len())
            .into_par_iter()
            .map(|s1| {
                let mut count = 0usize;
                for (sp12, pair12) in pairs1[s1].iter().enumerate() {
                    let s2 = pair12.partner;
                    let s3_end = if reduce { s1 + 1 } else { pairs2.len() };
                    for s3 in 0..s3_end {
                        let n34 = if reduce && s3 == s1 {
                            sp12 + 1
                        } else {
                            pairs2[s3].len()
                        };
                        for pair34 in pairs2[s3].iter().take(n34) {
                            let s4 = pair34.partner;
                            let shells = [s1, s2, s3, s4];
                            let cauchy_schwarz = pair12
                                .cauchy_schwarz
                                .zip(pair34.cauchy_schwarz)
                                .map(|(cs12, cs34)| cs12 * cs34);
                            if !prescreener.is_significant(shells, cauchy_schwarz) {
                                continue;
                            }
                            let Some(buffer) = engine.compute2(
                                &shells1[s1],
                                &shells1[s2],
                                &shells2[s3],
                                &shells2[s4],
                                Some(&pair12.intermediates),
                                Some(&pair34.intermediates),
                            )?
                            else {
                                continue;
                            };
                            let quartet = ShellQuartet {
                                shells,
                                offsets: [
                                    shell_to_bf1[s1],
                                    shell_to_bf1[s2],
                                    shell_to_bf2[s3],
                                    shell_to_bf2[s4],
                                ],
                                sizes: [
                                    shells1[s1].n_funcs(),
                                    shells1[s2].n_funcs(),
                                    shells2[s3].n_funcs(),
                                    shells2[s4].n_funcs(),
                                ],
                            };
                            digester_ref.digest_quartet(buffer.view(), &quartet);
                            count += 1;
                        }
                    }
                }
                Ok::<_, anyhow::Error>(count)
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))?;

        log::debug!(
            "Digested {n_quartets} shell quartets of {} (derivative order {}){}.",
            self.specifier.op,
            self.specifier.deriv_order,
            if reduce {
                " with bra-ket symmetry"
            } else {
                ""
            }
        );
        digester.finalize()
    }
}
