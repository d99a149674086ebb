//! Permutational symmetry of four-index integrals.
//!
//! For real basis functions, $`(ij|kl)`$ is invariant under $`i \leftrightarrow j`$,
//! $`k \leftrightarrow l`$ and, when both pairs come from the same basis set and describe the
//! same particle type, under the exchange of the bra and ket pairs. Each [`IntegralSymmetry`]
//! selects which of these invariances is exploited.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "symmetry_tests.rs"]
mod symmetry_tests;

/// A quadruplet of basis-function (or shell) indices `[i, j, k, l]` of $`(ij|kl)`$.
pub type QuartetIndex = [usize; 4];

/// The permutational symmetries of four-index integrals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegralSymmetry {
    /// No symmetry.
    Onefold,

    /// Invariance under the simultaneous exchange $`(ij|kl) = (ji|lk)`$, or, for index sets,
    /// under the exchange of bra and ket.
    Twofold,

    /// Invariance under $`i \leftrightarrow j`$ and $`k \leftrightarrow l`$.
    Fourfold,

    /// The fourfold symmetry plus bra-ket exchange.
    Eightfold,
}

impl IntegralSymmetry {
    /// The number of index quadruplets collapsed into the canonical quadruplet `index`.
    pub fn degeneracy(&self, index: QuartetIndex) -> f64 {
        let [i, j, k, l] = index;
        let bra = if i == j { 1.0 } else { 2.0 };
        let ket = if k == l { 1.0 } else { 2.0 };
        let bra_ket = if i == k && j == l { 1.0 } else { 2.0 };
        match self {
            IntegralSymmetry::Onefold => 1.0,
            IntegralSymmetry::Twofold => bra_ket,
            IntegralSymmetry::Fourfold => bra * ket,
            IntegralSymmetry::Eightfold => bra * ket * bra_ket,
        }
    }

    /// Maps `index` to the representative of its symmetry class: the larger index first within
    /// each pair and, where bra and ket are interchangeable, the larger pair first.
    pub fn mapped_index(&self, index: QuartetIndex) -> QuartetIndex {
        match self {
            IntegralSymmetry::Onefold => index,
            IntegralSymmetry::Twofold => order_pairs(index),
            IntegralSymmetry::Fourfold => order_within_pairs(index),
            IntegralSymmetry::Eightfold => order_pairs(order_within_pairs(index)),
        }
    }

    /// All distinct quadruplets symmetry-equivalent to `index`, starting with `index` itself.
    pub fn symmetric_indices(&self, index: QuartetIndex) -> Vec<QuartetIndex> {
        self.permutations()
            .iter()
            .map(|perm| permute(index, *perm))
            .unique()
            .collect()
    }

    /// The position permutations generating the symmetry class. Entry `q` of a permutation
    /// names the position of the original quadruplet that moves to position `q`.
    pub(crate) fn permutations(&self) -> &'static [QuartetIndex] {
        match self {
            IntegralSymmetry::Onefold => &PERMUTATIONS[..1],
            IntegralSymmetry::Twofold => &TWOFOLD_PERMUTATIONS,
            IntegralSymmetry::Fourfold => &PERMUTATIONS[..4],
            IntegralSymmetry::Eightfold => &PERMUTATIONS,
        }
    }
}

impl fmt::Display for IntegralSymmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegralSymmetry::Onefold => write!(f, "onefold"),
            IntegralSymmetry::Twofold => write!(f, "twofold"),
            IntegralSymmetry::Fourfold => write!(f, "fourfold"),
            IntegralSymmetry::Eightfold => write!(f, "eightfold"),
        }
    }
}

/// $`(ij|kl)`$, $`(ij|lk)`$, $`(ji|kl)`$, $`(ji|lk)`$, then the same with bra and ket exchanged.
const PERMUTATIONS: [QuartetIndex; 8] = [
    [0, 1, 2, 3],
    [0, 1, 3, 2],
    [1, 0, 2, 3],
    [1, 0, 3, 2],
    [2, 3, 0, 1],
    [2, 3, 1, 0],
    [3, 2, 0, 1],
    [3, 2, 1, 0],
];

const TWOFOLD_PERMUTATIONS: [QuartetIndex; 2] = [[0, 1, 2, 3], [2, 3, 0, 1]];

/// Applies a position permutation to a quadruplet.
pub(crate) fn permute(index: QuartetIndex, perm: QuartetIndex) -> QuartetIndex {
    perm.map(|p| index[p])
}

/// The position to which a position permutation moves the entry originally at `position`.
pub(crate) fn moved_position(perm: &QuartetIndex, position: usize) -> usize {
    perm.iter()
        .position(|&p| p == position)
        .unwrap_or(position)
}

fn order_within_pairs(index: QuartetIndex) -> QuartetIndex {
    let [i, j, k, l] = index;
    [i.max(j), i.min(j), k.max(l), k.min(l)]
}

fn order_pairs(index: QuartetIndex) -> QuartetIndex {
    let [i, j, k, l] = index;
    if k > i || (k == i && l > j) {
        [k, l, i, j]
    } else {
        index
    }
}
