//! A McMurchie–Davidson integral engine over contracted Cartesian and pure Gaussian shells.
//!
//! The engine is the only place where primitive Gaussian algebra happens. Everything above it
//! (shell-pair lists, one- and two-body evaluators, digesters) sees packed shell-block buffers
//! with one row per requested result.

use std::f64::consts::PI;
use std::fmt;

use anyhow::{self, ensure, format_err};
use nalgebra::Point3;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::auxiliary::atom::{Atom, ElementMap};
use crate::basis::shell::{cart_tuples, Shell};
use crate::integrals::engine::boys::BoysTable;
use crate::integrals::engine::solid_harmonics::cart_to_pure;

pub(crate) mod boys;
pub(crate) mod hermite;
mod one_body;
pub(crate) mod solid_harmonics;
mod two_body;


// ===========
// PointCharge
// ===========

/// A point charge as seen by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointCharge {
    /// The charge in units of the elementary charge.
    pub charge: f64,

    /// The position in bohr.
    pub position: Point3<f64>,
}

impl From<&Atom> for PointCharge {
    fn from(atom: &Atom) -> Self {
        Self {
            charge: f64::from(atom.atomic_number),
            position: atom.coordinates,
        }
    }
}

/// Converts atoms to engine point charges carrying the nuclear charges.
pub fn point_charges_from_atoms(atoms: &[Atom]) -> Vec<PointCharge> {
    atoms.iter().map(PointCharge::from).collect()
}

/// Converts engine point charges back to atoms.
///
/// # Errors
///
/// Errors if a charge does not correspond to a known element.
pub fn atoms_from_point_charges(
    charges: &[PointCharge],
    emap: &ElementMap,
) -> Result<Vec<Atom>, anyhow::Error> {
    charges
        .iter()
        .map(|pc| {
            ensure!(
                pc.charge > 0.0 && pc.charge.fract() == 0.0,
                "Point charge {} does not correspond to a nucleus.",
                pc.charge
            );
            let atomic_number = pc.charge as u32;
            let symbol = emap
                .symbol(atomic_number)
                .ok_or_else(|| format_err!("Unknown atomic number {atomic_number}."))?;
            Atom::new(symbol, pc.position, emap)
        })
        .collect()
}

// =============
// EngineContext
// =============

/// Session-wide engine data: the tabulated Boys function and the Cartesian-to-pure
/// transformation matrices.
///
/// One context is created per evaluation session and shared by reference across all worker
/// threads.
#[derive(Clone, Debug)]
pub struct EngineContext {
    max_l: u32,
    boys: BoysTable,
    pure_transforms: Vec<Array2<f64>>,
}

impl EngineContext {
    /// Creates a context able to handle shells with angular momenta up to `max_l`, including
    /// first derivatives of electron-repulsion integrals.
    pub fn new(max_l: u32) -> Self {
        log::debug!("Setting up integral engine context for angular momenta up to {max_l}.");
        Self {
            max_l,
            boys: BoysTable::new(4 * max_l as usize + 2),
            pure_transforms: (0..=max_l).map(cart_to_pure).collect(),
        }
    }

    /// The highest shell angular momentum supported.
    pub fn max_l(&self) -> u32 {
        self.max_l
    }

    pub(crate) fn boys(&self) -> &BoysTable {
        &self.boys
    }

    pub(crate) fn pure_transform(&self, l: usize) -> &Array2<f64> {
        &self.pure_transforms[l]
    }
}

// ===========
// EngineShell
// ===========

/// A shell with normalisation folded into its contraction coefficients.
#[derive(Clone, Debug)]
pub struct EngineShell {
    pub(crate) l: usize,
    pub(crate) pure: bool,
    pub(crate) exponents: Vec<f64>,
    pub(crate) coefficients: Vec<f64>,
    pub(crate) origin: [f64; 3],
    pub(crate) carts: Vec<[usize; 3]>,
}

/// Double factorial $`(2l - 1)!!`$, with $`(-1)!! = 1`$.
fn odd_double_factorial(l: usize) -> f64 {
    (1..=l).map(|k| (2 * k - 1) as f64).product()
}

impl EngineShell {
    /// Normalises the primitives of `shell` and renormalises the contraction so that every
    /// Cartesian component has the norm of $`x^l`$.
    pub fn new(shell: &Shell) -> Self {
        let l = shell.l as usize;
        let dfact = odd_double_factorial(l);
        let mut coefficients = shell
            .exponents
            .iter()
            .zip(shell.coefficients.iter())
            .map(|(&alpha, &c)| {
                c * (2.0 * alpha / PI).powf(0.75) * (4.0 * alpha).powf(0.5 * l as f64)
                    / dfact.sqrt()
            })
            .collect::<Vec<_>>();
        let norm2 = shell
            .exponents
            .iter()
            .zip(coefficients.iter())
            .flat_map(|(&ai, &ci)| {
                shell
                    .exponents
                    .iter()
                    .zip(coefficients.iter())
                    .map(move |(&aj, &cj)| {
                        let p = ai + aj;
                        ci * cj * (PI / p).powf(1.5) * dfact / (2.0 * p).powi(l as i32)
                    })
            })
            .sum::<f64>();
        if norm2 > 0.0 {
            let scale = norm2.sqrt().recip();
            coefficients.iter_mut().for_each(|c| *c *= scale);
        }
        Self {
            l,
            pure: shell.pure && l > 1,
            exponents: shell.exponents.clone(),
            coefficients,
            origin: [shell.origin.x, shell.origin.y, shell.origin.z],
            carts: cart_tuples(shell.l)
                .into_iter()
                .map(|(lx, ly, lz)| [lx as usize, ly as usize, lz as usize])
                .collect(),
        }
    }

    /// The number of Cartesian components.
    pub(crate) fn n_cart(&self) -> usize {
        self.carts.len()
    }

    /// The number of functions after the optional transformation to pure functions.
    pub(crate) fn n_funcs(&self) -> usize {
        if self.pure {
            2 * self.l + 1
        } else {
            self.carts.len()
        }
    }

    /// The Cartesian-to-pure transformation of this shell, if any.
    pub(crate) fn transform<'a>(&self, context: &'a EngineContext) -> Option<&'a Array2<f64>> {
        if self.pure {
            Some(context.pure_transform(self.l))
        } else {
            None
        }
    }
}

// ======================
// ShellPairIntermediates
// ======================

/// Quantities shared by every integral involving one primitive pair.
#[derive(Clone, Debug)]
pub(crate) struct PrimitivePair {
    pub(crate) alpha: f64,
    pub(crate) beta: f64,

    /// $`p = \alpha + \beta`$.
    pub(crate) p: f64,

    /// The Gaussian product centre $`\mathbf{P}`$.
    pub(crate) centre: [f64; 3],

    /// $`c_a c_b \exp(-\mu R_{AB}^2)`$.
    pub(crate) prefactor: f64,
}

/// Precomputed primitive-pair data of an ordered shell pair $`(A, B)`$.
#[derive(Clone, Debug)]
pub struct ShellPairIntermediates {
    pub(crate) primitive_pairs: Vec<PrimitivePair>,
}

impl ShellPairIntermediates {
    /// Builds the primitive pairs of `(a, b)`, dropping those whose Gaussian overlap factor
    /// $`\exp(-\mu R_{AB}^2)`$ is below `exp(ln_precision)`.
    pub fn new(a: &EngineShell, b: &EngineShell, ln_precision: f64) -> Self {
        let rab2 = (0..3)
            .map(|k| (a.origin[k] - b.origin[k]).powi(2))
            .sum::<f64>();
        let mut primitive_pairs = Vec::with_capacity(a.exponents.len() * b.exponents.len());
        for (&alpha, &ca) in a.exponents.iter().zip(a.coefficients.iter()) {
            for (&beta, &cb) in b.exponents.iter().zip(b.coefficients.iter()) {
                let p = alpha + beta;
                let exponent = -alpha * beta / p * rab2;
                if exponent < ln_precision {
                    continue;
                }
                let centre = [0, 1, 2].map(|k| (alpha * a.origin[k] + beta * b.origin[k]) / p);
                primitive_pairs.push(PrimitivePair {
                    alpha,
                    beta,
                    p,
                    centre,
                    prefactor: ca * cb * exponent.exp(),
                });
            }
        }
        Self { primitive_pairs }
    }

    /// The number of retained primitive pairs.
    pub fn len(&self) -> usize {
        self.primitive_pairs.len()
    }

    /// Whether every primitive pair has been screened out.
    pub fn is_empty(&self) -> bool {
        self.primitive_pairs.is_empty()
    }
}

// ==============
// EngineOperator
// ==============

/// Operators known to the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineOperator {
    /// $`\langle a | b \rangle`$.
    Overlap,

    /// $`\langle a | -\tfrac{1}{2}\nabla^2 | b \rangle`$.
    Kinetic,

    /// $`\langle a | -\sum_C Z_C / |\mathbf{r} - \mathbf{C}| | b \rangle`$.
    Nuclear(Vec<PointCharge>),

    /// $`\langle a | \mathbf{r} - \mathbf{O} | b \rangle`$ about the contained origin.
    Dipole([f64; 3]),

    /// $`(ab|cd)`$ with the $`1/r_{12}`$ kernel.
    Coulomb,
}

impl EngineOperator {
    /// The number of operator components.
    pub fn n_components(&self) -> usize {
        match self {
            EngineOperator::Dipole(_) => 3,
            _ => 1,
        }
    }

    /// Whether this is a two-body operator.
    pub fn is_two_body(&self) -> bool {
        matches!(self, EngineOperator::Coulomb)
    }
}

impl fmt::Display for EngineOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineOperator::Overlap => write!(f, "overlap"),
            EngineOperator::Kinetic => write!(f, "kinetic"),
            EngineOperator::Nuclear(charges) => {
                write!(f, "nuclear attraction ({} point charges)", charges.len())
            }
            EngineOperator::Dipole(origin) => write!(
                f,
                "dipole about ({:+.6}, {:+.6}, {:+.6})",
                origin[0], origin[1], origin[2]
            ),
            EngineOperator::Coulomb => write!(f, "Coulomb repulsion"),
        }
    }
}

// ======
// Engine
// ======

/// An integral engine for one operator at one derivative order.
///
/// Results are returned as a matrix with one row per result and the shell block packed
/// row-major along each row. Rows are ordered as
/// `component * (n_centres * n_derivs) + centre * n_derivs + d`, where `d` runs over the
/// Cartesian derivative directions (a single entry for values).
#[derive(Clone, Debug)]
pub struct Engine<'a> {
    context: &'a EngineContext,
    operator: EngineOperator,
    deriv_order: u32,
    precision: f64,
}

impl<'a> Engine<'a> {
    /// Creates a new engine with the default precision of machine epsilon.
    ///
    /// # Errors
    ///
    /// Errors if a derivative order above one is requested.
    pub fn new(
        context: &'a EngineContext,
        operator: EngineOperator,
        deriv_order: u32,
    ) -> Result<Self, anyhow::Error> {
        ensure!(
            deriv_order <= 1,
            "Only values and first derivatives are available, but derivative order {deriv_order} was requested."
        );
        Ok(Self {
            context,
            operator,
            deriv_order,
            precision: f64::EPSILON,
        })
    }

    /// Sets the screening precision. A precision of zero disables primitive screening.
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// The operator of this engine.
    pub fn operator(&self) -> &EngineOperator {
        &self.operator
    }

    /// The derivative order of this engine.
    pub fn deriv_order(&self) -> u32 {
        self.deriv_order
    }

    /// The screening precision.
    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub(crate) fn ln_precision(&self) -> f64 {
        if self.precision > 0.0 {
            self.precision.ln()
        } else {
            f64::NEG_INFINITY
        }
    }

    pub(crate) fn context(&self) -> &EngineContext {
        self.context
    }

    /// The number of derivative centres of a one-body shell pair.
    pub fn n_centres_one_body(&self) -> usize {
        match (&self.operator, self.deriv_order) {
            (_, 0) => 1,
            (EngineOperator::Nuclear(charges), _) => 2 + charges.len(),
            _ => 2,
        }
    }

    /// The number of derivative directions per centre.
    pub fn n_derivs(&self) -> usize {
        if self.deriv_order == 0 {
            1
        } else {
            3
        }
    }

    /// Computes the one-body shell block $`\langle a | \hat{O} | b \rangle`$.
    ///
    /// # Returns
    ///
    /// `None` if every primitive pair has been screened out.
    ///
    /// # Errors
    ///
    /// Errors if the engine operator is a two-body operator.
    pub fn compute1(
        &self,
        a: &EngineShell,
        b: &EngineShell,
    ) -> Result<Option<Array2<f64>>, anyhow::Error> {
        ensure!(
            !self.operator.is_two_body(),
            "Operator `{}` cannot be evaluated over a shell pair.",
            self.operator
        );
        Ok(one_body::compute(self, a, b))
    }

    /// Computes the two-body shell block $`(ab|cd)`$.
    ///
    /// Derivative rows are ordered as `centre * 3 + xyz` over the four shell centres.
    ///
    /// # Arguments
    ///
    /// * `pair_ab` - Precomputed intermediates of the ordered pair `(a, b)`, built on the fly
    ///   if absent.
    /// * `pair_cd` - Precomputed intermediates of the ordered pair `(c, d)`, built on the fly
    ///   if absent.
    ///
    /// # Returns
    ///
    /// `None` if every primitive quartet has been screened out.
    ///
    /// # Errors
    ///
    /// Errors if the engine operator is not a two-body operator.
    #[allow(clippy::too_many_arguments)]
    pub fn compute2(
        &self,
        a: &EngineShell,
        b: &EngineShell,
        c: &EngineShell,
        d: &EngineShell,
        pair_ab: Option<&ShellPairIntermediates>,
        pair_cd: Option<&ShellPairIntermediates>,
    ) -> Result<Option<Array2<f64>>, anyhow::Error> {
        ensure!(
            self.operator.is_two_body(),
            "Operator `{}` cannot be evaluated over a shell quartet.",
            self.operator
        );
        let owned_ab;
        let pair_ab = match pair_ab {
            Some(pair) => pair,
            None => {
                owned_ab = ShellPairIntermediates::new(a, b, self.ln_precision());
                &owned_ab
            }
        };
        let owned_cd;
        let pair_cd = match pair_cd {
            Some(pair) => pair,
            None => {
                owned_cd = ShellPairIntermediates::new(c, d, self.ln_precision());
                &owned_cd
            }
        };
        Ok(two_body::compute(self, [a, b, c, d], pair_ab, pair_cd))
    }
}

/// Returns `exps` with the exponent along `axis` shifted by `delta`, or `None` if the result
/// would be negative.
pub(crate) fn shifted(exps: [usize; 3], axis: usize, delta: isize) -> Option<[usize; 3]> {
    let mut out = exps;
    let value = exps[axis] as isize + delta;
    if value < 0 {
        None
    } else {
        out[axis] = value as usize;
        Some(out)
    }
}

/// Derivative of a primitive integral with respect to the centre of a Gaussian with exponent
/// `zeta` and Cartesian exponents `exps`:
/// $`2\zeta f(i + 1) - i f(i - 1)`$.
pub(crate) fn centre_derivative<F>(exps: [usize; 3], axis: usize, zeta: f64, f: F) -> f64
where
    F: Fn([usize; 3]) -> f64,
{
    let up = shifted(exps, axis, 1).map(&f).unwrap_or(0.0);
    let down = shifted(exps, axis, -1)
        .map(|e| exps[axis] as f64 * f(e))
        .unwrap_or(0.0);
    2.0 * zeta * up - down
}
