use std::fmt;

use derive_builder::Builder;
use itertools::Itertools;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Returns the Cartesian exponent tuples $`(l_x, l_y, l_z)`$ of rank `l` in lexicographic order.
///
/// # Examples
///
/// For $`l = 2`$: `xx, xy, xz, yy, yz, zz`.
pub fn cart_tuples(l: u32) -> Vec<(u32, u32, u32)> {
    let mut tuples = Vec::with_capacity(((l + 1) * (l + 2)).div_euclid(2) as usize);
    for lx in (0..=l).rev() {
        for ly in (0..=(l - lx)).rev() {
            tuples.push((lx, ly, l - lx - ly));
        }
    }
    tuples
}

/// An enumerated type describing the order of functions within a shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellOrder {
    /// Real solid harmonics with the contained $`m`$ values in order.
    Pure(Vec<i32>),

    /// Cartesian functions with the contained exponent tuples in order.
    Cart(Vec<(u32, u32, u32)>),
}

impl fmt::Display for ShellOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellOrder::Pure(mls) => write!(
                f,
                "Pure ({})",
                mls.iter().map(|m| format!("{m:+}")).join(", ")
            ),
            ShellOrder::Cart(tuples) => write!(
                f,
                "Cart ({})",
                tuples
                    .iter()
                    .map(|&(lx, ly, lz)| {
                        "x".repeat(lx as usize) + &"y".repeat(ly as usize) + &"z".repeat(lz as usize)
                    })
                    .map(|s| if s.is_empty() { "1".to_string() } else { s })
                    .join(", ")
            ),
        }
    }
}

/// A contracted Gaussian shell. The contraction coefficients refer to normalised primitives.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shell {
    /// The angular momentum of the shell.
    pub l: u32,

    /// Whether the shell consists of real solid harmonics (`true`) or Cartesian functions.
    #[builder(default = "true")]
    pub pure: bool,

    /// The primitive exponents.
    pub exponents: Vec<f64>,

    /// The contraction coefficients, one per exponent.
    pub coefficients: Vec<f64>,

    /// The centre of the shell in bohr.
    pub origin: Point3<f64>,

    /// The index of the atom carrying this shell.
    #[builder(default = "0")]
    pub atom_index: usize,
}

impl Shell {
    /// Returns a builder to construct a new [`Shell`].
    pub fn builder() -> ShellBuilder {
        ShellBuilder::default()
    }

    /// The number of basis functions in this shell.
    pub fn n_funcs(&self) -> usize {
        if self.pure {
            (2 * self.l + 1) as usize
        } else {
            ((self.l + 1) * (self.l + 2)).div_euclid(2) as usize
        }
    }

    /// The number of primitives in the contraction.
    pub fn n_primitives(&self) -> usize {
        self.exponents.len()
    }

    /// The order of the functions in this shell: increasing $`m`$ for pure shells, lexicographic
    /// for Cartesian shells. Pure $`p`$ shells keep the Cartesian order $`x, y, z`$.
    pub fn shell_order(&self) -> ShellOrder {
        if self.pure && self.l > 1 {
            let li = self.l as i32;
            ShellOrder::Pure((-li..=li).collect_vec())
        } else {
            ShellOrder::Cart(cart_tuples(self.l))
        }
    }

    /// Whether this shell shares its centre with another one.
    pub fn same_centre(&self, other: &Shell) -> bool {
        self.origin == other.origin
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lchar = ["s", "p", "d", "f", "g", "h", "i"]
            .get(self.l as usize)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("l={}", self.l));
        write!(
            f,
            "{lchar} shell on atom {} ({} primitives, {})",
            self.atom_index,
            self.n_primitives(),
            self.shell_order()
        )
    }
}
