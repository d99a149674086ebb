use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{self, ensure, format_err, Context};
use serde::{Deserialize, Serialize};

use crate::auxiliary::atom::{Atom, ElementMap};

#[cfg(test)]
#[path = "molecule_tests.rs"]
mod molecule_tests;

/// A struct containing the atoms constituting a molecule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    /// The atoms constituting this molecule.
    pub atoms: Vec<Atom>,
}

impl Molecule {
    /// Constructs a molecule from a vector of atoms.
    pub fn from_atoms(atoms: &[Atom]) -> Self {
        Self {
            atoms: atoms.to_vec(),
        }
    }

    /// Parses an `xyz` file to construct a molecule.
    ///
    /// # Arguments
    ///
    /// * `filename` - The `xyz` file to be parsed.
    ///
    /// # Returns
    ///
    /// The parsed [`Molecule`] struct.
    pub fn from_xyz<P: AsRef<Path>>(filename: P) -> Result<Self, anyhow::Error> {
        let contents = fs::read_to_string(filename.as_ref()).with_context(|| {
            format!("Unable to read file {}.", filename.as_ref().display())
        })?;
        Self::from_xyz_str(&contents)
    }

    /// Parses the contents of an `xyz` file to construct a molecule. The first line holds the
    /// number of atoms, the second line is a comment, and every subsequent non-empty line is an
    /// atom line with coordinates in Ångström.
    pub fn from_xyz_str(contents: &str) -> Result<Self, anyhow::Error> {
        let emap = ElementMap::new();
        let mut lines = contents.lines();
        let n_atoms = lines
            .next()
            .ok_or_else(|| format_err!("Empty xyz contents."))?
            .trim()
            .parse::<usize>()
            .map_err(|err| format_err!("Unable to parse the number of atoms: {err}."))?;
        let atoms = lines
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(|line| Atom::from_xyz(line, &emap))
            .collect::<Result<Vec<_>, _>>()?;
        ensure!(
            atoms.len() == n_atoms,
            "Expected {} atoms, got {} instead.",
            n_atoms,
            atoms.len()
        );
        Ok(Molecule { atoms })
    }

    /// The total mass of the nuclei in this molecule.
    pub fn total_mass(&self) -> f64 {
        self.atoms.iter().map(|atom| atom.atomic_mass).sum()
    }

    /// The distinct atomic symbols in this molecule, in order of first appearance.
    pub fn elements(&self) -> Vec<&str> {
        let mut elements: Vec<&str> = vec![];
        for atom in self.atoms.iter() {
            if !elements.contains(&atom.atomic_symbol.as_str()) {
                elements.push(&atom.atomic_symbol);
            }
        }
        elements
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Molecule with {} atoms (bohr):", self.atoms.len())?;
        for atom in self.atoms.iter() {
            writeln!(f, "{atom}")?;
        }
        Ok(())
    }
}
