//! Basis sets over the atoms of a molecule.

use std::fmt;
use std::ops::Index;

use anyhow::{self, format_err};
use indexmap::IndexMap;
use itertools::Itertools;

use crate::auxiliary::atom::Atom;
use crate::basis::library::builtin_basis_set;
use crate::basis::shell::Shell;
use crate::basis::shell_pairs::ShellPairs;
use crate::integrals::engine::EngineShell;

#[cfg(test)]
#[path = "basis_set_tests.rs"]
mod basis_set_tests;

/// An ordered collection of shells together with the atoms they are centred on.
///
/// Two basis sets compare equal if their shells are equal.
#[derive(Clone, Debug)]
pub struct BasisSet {
    /// The shells, grouped by atom.
    shells: Vec<Shell>,

    /// The atoms carrying the shells.
    atoms: Vec<Atom>,

    /// The index of the first basis function of each shell.
    shell_to_bf: Vec<usize>,

    /// Whether the shells are pure.
    pure: bool,

    /// The shell pairs, once evaluated.
    shell_pairs: Option<ShellPairs>,
}

impl BasisSet {
    /// Creates a basis set from its shells.
    pub fn new(shells: Vec<Shell>, atoms: Vec<Atom>, pure: bool) -> Self {
        let shell_to_bf = shell_offsets(&shells);
        Self {
            shells,
            atoms,
            shell_to_bf,
            pure,
            shell_pairs: None,
        }
    }

    /// Builds a basis set from a built-in basis set for all atoms.
    ///
    /// # Arguments
    ///
    /// * `name` - The case-insensitive basis set name.
    /// * `atoms` - The atoms, with coordinates in bohr.
    /// * `pure` - Whether the shells consist of real solid harmonics.
    pub fn from_library(name: &str, atoms: &[Atom], pure: bool) -> Result<Self, anyhow::Error> {
        let library = builtin_basis_set(name)?;
        let shells = atoms
            .iter()
            .enumerate()
            .map(|(i, atom)| library.shells_for_atom(atom, i, pure))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect_vec();
        Ok(Self::new(shells, atoms.to_vec(), pure))
    }

    /// Builds a basis set with a separate built-in basis set per element. The shells of each
    /// element are appended group by group in the order of the map.
    ///
    /// # Errors
    ///
    /// Errors if an element of the map has no atom in `atoms`.
    pub fn from_element_map(
        names: &IndexMap<String, String>,
        atoms: &[Atom],
        pure: bool,
    ) -> Result<Self, anyhow::Error> {
        let mut basis = Self::new(vec![], vec![], pure);
        for (element, name) in names.iter() {
            let group = atoms
                .iter()
                .enumerate()
                .filter(|(_, atom)| &atom.atomic_symbol == element)
                .collect_vec();
            if group.is_empty() {
                return Err(format_err!(
                    "Element `{element}` not contained in molecular structure."
                ));
            }
            let library = builtin_basis_set(name)?;
            let shells = group
                .iter()
                .map(|(i, atom)| library.shells_for_atom(atom, *i, pure))
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .flatten()
                .collect_vec();
            basis.append_shells(shells);
        }
        basis.atoms = atoms.to_vec();
        Ok(basis)
    }

    /// Retrieves a basis set from BasisSetExchange for all atoms.
    #[cfg(feature = "bse")]
    pub fn from_bse(name: &str, atoms: &[Atom], pure: bool) -> Result<Self, anyhow::Error> {
        let elements = atoms
            .iter()
            .map(|atom| atom.atomic_symbol.as_str())
            .unique()
            .collect_vec();
        let response = crate::basis::library::fetch_bse(name, &elements)?;
        let shells = atoms
            .iter()
            .enumerate()
            .map(|(i, atom)| response.shells_for_atom(atom, i, pure))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect_vec();
        Ok(Self::new(shells, atoms.to_vec(), pure))
    }

    /// Appends shells at the end of this basis set. Existing shell pairs are discarded.
    pub fn append_shells(&mut self, shells: Vec<Shell>) {
        self.shells.extend(shells);
        self.shell_to_bf = shell_offsets(&self.shells);
        self.shell_pairs = None;
    }

    /// The shells.
    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    /// The atoms.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Whether the shells are pure.
    pub fn is_pure(&self) -> bool {
        self.pure
    }

    /// The number of shells.
    pub fn n_shells(&self) -> usize {
        self.shells.len()
    }

    /// The number of basis functions.
    pub fn n_funcs(&self) -> usize {
        self.shells.iter().map(Shell::n_funcs).sum()
    }

    /// The index of the first basis function of each shell.
    pub fn shell_to_bf(&self) -> &[usize] {
        &self.shell_to_bf
    }

    /// The atom index of each shell.
    pub fn shell_to_atom(&self) -> Vec<usize> {
        self.shells.iter().map(|shell| shell.atom_index).collect()
    }

    /// The shell indices of each atom.
    pub fn atom_to_shells(&self) -> Vec<Vec<usize>> {
        let mut map = vec![vec![]; self.atoms.len()];
        for (i, shell) in self.shells.iter().enumerate() {
            if let Some(list) = map.get_mut(shell.atom_index) {
                list.push(i);
            }
        }
        map
    }

    /// The highest angular momentum of all shells.
    pub fn max_l(&self) -> u32 {
        self.shells.iter().map(|shell| shell.l).max().unwrap_or(0)
    }

    /// The largest number of primitives of all shells.
    pub fn max_n_primitives(&self) -> usize {
        self.shells
            .iter()
            .map(Shell::n_primitives)
            .max()
            .unwrap_or(0)
    }

    /// The shells prepared for the integral engine.
    pub fn engine_shells(&self) -> Vec<EngineShell> {
        self.shells.iter().map(EngineShell::new).collect()
    }

    /// The shell pairs, if evaluated.
    pub fn shell_pairs(&self) -> Option<&ShellPairs> {
        self.shell_pairs.as_ref()
    }

    /// Whether shell pairs have been evaluated.
    pub fn are_shell_pairs_evaluated(&self) -> bool {
        self.shell_pairs.is_some()
    }

    /// Attaches evaluated shell pairs.
    pub fn set_shell_pairs(&mut self, shell_pairs: ShellPairs) {
        self.shell_pairs = Some(shell_pairs);
    }
}

fn shell_offsets(shells: &[Shell]) -> Vec<usize> {
    shells
        .iter()
        .scan(0, |acc, shell| {
            let start = *acc;
            *acc += shell.n_funcs();
            Some(start)
        })
        .collect()
}

impl PartialEq for BasisSet {
    fn eq(&self, other: &Self) -> bool {
        self.shells == other.shells
    }
}

impl Index<usize> for BasisSet {
    type Output = Shell;

    fn index(&self, i: usize) -> &Self::Output {
        &self.shells[i]
    }
}

impl fmt::Display for BasisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Basis set: {} shells, {} {} functions on {} atoms",
            self.n_shells(),
            self.n_funcs(),
            if self.pure { "pure" } else { "Cartesian" },
            self.atoms.len()
        )?;
        for (i, shell) in self.shells.iter().enumerate() {
            writeln!(f, "  #{i:>3} (bf {:>4}): {shell}", self.shell_to_bf[i])?;
        }
        Ok(())
    }
}
