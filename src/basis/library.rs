//! Basis set data in the BasisSetExchange JSON format.

use std::collections::HashMap;

use anyhow::{self, format_err};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::auxiliary::atom::Atom;
use crate::basis::shell::Shell;

#[cfg(test)]
#[path = "library_tests.rs"]
mod library_tests;

#[cfg(feature = "bse")]
const BSE_BASE_API: &str = "https://www.basissetexchange.org/api";

const CONTRACTION_COEFF_THRESH: f64 = 1e-16;

lazy_static! {
    /// Basis sets shipped with the crate, keyed by lower-case name.
    static ref BUILTIN_BASIS_SETS: HashMap<&'static str, &'static str> = HashMap::from([
        ("sto-3g", include_str!("data/sto-3g.json")),
        ("def2-svp", include_str!("data/def2-svp.json")),
        ("def2-tzvp", include_str!("data/def2-tzvp.json")),
    ]);
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Deserialisable structs for BSE data retrieval
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A structure to represent a basis set in the BasisSetExchange JSON format.
#[derive(Serialize, Deserialize, Debug)]
pub(crate) struct BSEResponse {
    /// Name of the basis set.
    name: String,

    /// Version of the basis set.
    version: String,

    /// A hashmap between atomic numbers (as strings) and element basis information.
    elements: HashMap<String, BSEElement>,
}

/// A structure to handle basis set information for an element.
#[derive(Serialize, Deserialize, Debug)]
struct BSEElement {
    /// A vector of basis set information for the shells in this element.
    electron_shells: Vec<BSEElectronShell>,
}

/// A structure to handle basis set information for a shell.
#[derive(Serialize, Deserialize, Debug)]
#[serde(try_from = "BSEElectronShellRaw")]
struct BSEElectronShell {
    /// The type of basis functions in this shell.
    function_type: String,

    /// The chemical region described by this shell.
    region: String,

    /// The angular momenta of this shell. SP shells carry two entries.
    angular_momentum: Vec<u32>,

    /// A vector of primitive exponents.
    exponents: Vec<f64>,

    /// A vector of vectors of primitive coefficients. Each inner vector is to be interpreted as a
    /// separate shell with the same primitive exponents, but different contraction coefficients.
    coefficients: Vec<Vec<f64>>,
}

/// A structure to handle basis set information for a shell, as stored raw by BasisSetExchange.
#[derive(Deserialize)]
struct BSEElectronShellRaw {
    function_type: String,
    region: String,
    angular_momentum: Vec<u32>,
    exponents: Vec<String>,
    coefficients: Vec<Vec<String>>,
}

/// Parses a Fortran-style float, which may use `D` as the exponent marker.
fn parse_fortran_float(s: &str) -> Result<f64, std::num::ParseFloatError> {
    s.trim().replace(['D', 'd'], "E").parse::<f64>()
}

impl TryFrom<BSEElectronShellRaw> for BSEElectronShell {
    type Error = std::num::ParseFloatError;

    fn try_from(other: BSEElectronShellRaw) -> Result<Self, Self::Error> {
        let converted = Self {
            function_type: other.function_type,
            region: other.region,
            angular_momentum: other.angular_momentum,
            exponents: other
                .exponents
                .iter()
                .map(|s| parse_fortran_float(s))
                .collect::<Result<Vec<_>, _>>()?,
            coefficients: other
                .coefficients
                .iter()
                .map(|d| {
                    d.iter()
                        .map(|s| parse_fortran_float(s))
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(converted)
    }
}

impl BSEResponse {
    /// Builds the shells of `atom`, one per angular momentum and contraction column.
    ///
    /// # Arguments
    ///
    /// * `atom` - The atom carrying the shells.
    /// * `atom_index` - The index of `atom` in its molecule.
    /// * `pure` - Whether the shells consist of real solid harmonics.
    pub(crate) fn shells_for_atom(
        &self,
        atom: &Atom,
        atom_index: usize,
        pure: bool,
    ) -> Result<Vec<Shell>, anyhow::Error> {
        let element = self
            .elements
            .get(&atom.atomic_number.to_string())
            .ok_or_else(|| {
                format_err!(
                    "Basis information for element {} not found in basis set `{}`.",
                    atom.atomic_symbol,
                    self.name
                )
            })?;
        Ok(element
            .electron_shells
            .iter()
            .flat_map(|shell| {
                shell
                    .angular_momentum
                    .iter()
                    .cycle()
                    .zip(shell.coefficients.iter())
                    .map(|(&l, d)| {
                        let (exponents, coefficients): (Vec<f64>, Vec<f64>) = shell
                            .exponents
                            .iter()
                            .copied()
                            .zip(d.iter().copied())
                            .filter(|(_, c)| c.abs() > CONTRACTION_COEFF_THRESH)
                            .unzip();
                        Shell {
                            l,
                            pure,
                            exponents,
                            coefficients,
                            origin: atom.coordinates,
                            atom_index,
                        }
                    })
            })
            .collect())
    }
}

/// Names of the basis sets shipped with the crate.
pub fn builtin_basis_sets() -> Vec<&'static str> {
    let mut names = BUILTIN_BASIS_SETS.keys().copied().collect::<Vec<_>>();
    names.sort_unstable();
    names
}

/// Looks up a built-in basis set by its case-insensitive name.
pub(crate) fn builtin_basis_set(name: &str) -> Result<BSEResponse, anyhow::Error> {
    let contents = BUILTIN_BASIS_SETS
        .get(name.to_lowercase().as_str())
        .ok_or_else(|| {
            format_err!(
                "Basis set `{name}` not available. Built-in basis sets: {}.",
                builtin_basis_sets().join(", ")
            )
        })?;
    serde_yaml::from_str(contents)
        .map_err(|err| format_err!("Unable to parse basis set `{name}`: {err}."))
}

/// Retrieves basis information for the given elements from BasisSetExchange.
#[cfg(feature = "bse")]
pub(crate) fn fetch_bse(name: &str, elements: &[&str]) -> Result<BSEResponse, anyhow::Error> {
    let api_url = format!(
        "{BSE_BASE_API}/basis/\
        {name}/format/json/\
        ?elements={}",
        elements.join(",")
    );
    log::debug!("Requesting basis set from {api_url}.");
    let response: BSEResponse = reqwest::blocking::get(&api_url)?.json()?;
    Ok(response)
}
