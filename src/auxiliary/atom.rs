use std::collections::HashMap;
use std::fmt;

use anyhow::{self, format_err};
use nalgebra::Point3;
use periodic_table;
use serde::{Deserialize, Serialize};

/// Number of Ångströms in one bohr (CODATA 2018).
pub const BOHR_TO_ANGSTROM: f64 = 0.529177210903;

/// Number of bohrs in one Ångström.
pub const ANGSTROM_TO_BOHR: f64 = 1.0 / BOHR_TO_ANGSTROM;

/// A struct storing a look-up of element symbols to give atomic numbers
/// and atomic masses.
pub struct ElementMap<'a> {
    /// A [HashMap] from a symbol string to a tuple of atomic number and atomic
    /// mass.
    pub map: HashMap<&'a str, (u32, f64)>,
}

impl Default for ElementMap<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementMap<'static> {
    /// Creates a new [`ElementMap`] for all elements in the periodic table.
    #[must_use]
    pub fn new() -> ElementMap<'static> {
        let mut map = HashMap::new();
        let elements = periodic_table::periodic_table();
        for element in elements {
            if let Some(mass) = parse_atomic_mass(element.atomic_mass) {
                map.insert(element.symbol, (element.atomic_number, mass));
            }
        }
        ElementMap { map }
    }
}

impl<'a> ElementMap<'a> {
    /// Returns the atomic number and mass of an element given its symbol.
    pub fn get(&self, symbol: &str) -> Option<&(u32, f64)> {
        self.map.get(symbol)
    }

    /// Returns the symbol of the element with a given atomic number.
    pub fn symbol(&self, atomic_number: u32) -> Option<&'a str> {
        self.map
            .iter()
            .find(|(_, (z, _))| *z == atomic_number)
            .map(|(symbol, _)| *symbol)
    }
}

/// Parses the atomic mass string in the format of [`periodic_table`] to a single float value.
///
/// # Arguments
///
/// * `mass_str` - A string of mass value that is either `x.y(z)` where the
///     uncertain digit `z` is enclosed in parentheses, or `[x]` where `x`
///     is the mass number in place of precise experimental values.
fn parse_atomic_mass(mass_str: &str) -> Option<f64> {
    let mass = mass_str.replace(&['(', ')', '[', ']'][..], "");
    mass.parse::<f64>().ok()
}

/// A struct representing an atom. Coordinates are always held in bohr.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// The atomic number of the atom.
    pub atomic_number: u32,

    /// The atomic symbol of the atom.
    pub atomic_symbol: String,

    /// The weighted-average atomic mass for all naturally occuring isotopes.
    pub atomic_mass: f64,

    /// The position of the atom in bohr.
    pub coordinates: Point3<f64>,
}

impl Atom {
    /// Parses an atom line in an `xyz` file to construct an [`Atom`]. The coordinates in the line
    /// are interpreted in Ångström.
    ///
    /// # Arguments
    ///
    /// * `line` - A line in an `xyz` file containing an atomic symbol and
    ///     three Cartesian coordinates.
    /// * `emap` - A hash map between atomic symbols and atomic numbers and
    ///     masses.
    ///
    /// # Returns
    ///
    /// The parsed [`Atom`] struct if the line has the correct format.
    pub fn from_xyz(line: &str, emap: &ElementMap) -> Result<Atom, anyhow::Error> {
        let split: Vec<&str> = line.split_whitespace().collect();
        if split.len() != 4 {
            return Err(format_err!("Malformed xyz atom line: `{line}`."));
        };
        let coordinates = split[1..]
            .iter()
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|err| format_err!("Unable to parse coordinate `{s}`: {err}."))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Atom::new(
            split[0],
            Point3::new(coordinates[0], coordinates[1], coordinates[2]) * ANGSTROM_TO_BOHR,
            emap,
        )
    }

    /// Creates an atom at a position given in bohr.
    pub fn new(
        atomic_symbol: &str,
        coordinates: Point3<f64>,
        emap: &ElementMap,
    ) -> Result<Atom, anyhow::Error> {
        let (atomic_number, atomic_mass) = emap
            .get(atomic_symbol)
            .ok_or_else(|| format_err!("Invalid atomic symbol `{atomic_symbol}` encountered."))?;
        Ok(Atom {
            atomic_number: *atomic_number,
            atomic_symbol: atomic_symbol.to_string(),
            atomic_mass: *atomic_mass,
            coordinates,
        })
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>9} {:>3} {:+12.7} {:+12.7} {:+12.7}",
            "Atom",
            self.atomic_symbol,
            self.coordinates[0],
            self.coordinates[1],
            self.coordinates[2],
        )
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
