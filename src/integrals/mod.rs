//! Molecular integrals over contracted Gaussian shells.

use std::fmt;

use anyhow::{self, format_err};
use derive_builder::Builder;
use indexmap::IndexMap;
use nalgebra::Point3;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::auxiliary::atom::Atom;

pub mod density;
pub mod engine;
pub mod one_body;
pub mod two_body;

#[cfg(test)]
#[path = "integrals_tests.rs"]
mod integrals_tests;

// ========
// Operator
// ========

/// Operators whose integrals can be evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// The overlap operator.
    Overlap,

    /// The kinetic energy operator, scaled by the inverse particle mass.
    Kinetic,

    /// The kinetic energy operator with the centre-of-mass kinetic energy removed.
    KineticCOM,

    /// Attraction to the point charges of a set of atoms.
    PointCharges,

    /// The electric dipole operator about a multipole origin.
    Dipole,

    /// The Coulomb repulsion between two particles.
    Coulomb,

    /// The Coulomb repulsion with the mass-polarisation coupling term.
    CoulombCOM,
}

impl Operator {
    /// Whether the operator acts on two particles.
    pub fn is_two_body(&self) -> bool {
        matches!(self, Operator::Coulomb | Operator::CoulombCOM)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Overlap => write!(f, "Overlap"),
            Operator::Kinetic => write!(f, "Kinetic"),
            Operator::KineticCOM => write!(f, "KineticCOM"),
            Operator::PointCharges => write!(f, "PointCharges"),
            Operator::Dipole => write!(f, "Dipole"),
            Operator::Coulomb => write!(f, "Coulomb"),
            Operator::CoulombCOM => write!(f, "CoulombCOM"),
        }
    }
}

// =========
// ResultKey
// =========

/// Operator components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Component {
    /// Scalar operators.
    None,
    X,
    Y,
    Z,
}

impl Component {
    /// The Cartesian components of a vector operator.
    pub const XYZ: [Component; 3] = [Component::X, Component::Y, Component::Z];
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::None => write!(f, "-"),
            Component::X => write!(f, "x"),
            Component::Y => write!(f, "y"),
            Component::Z => write!(f, "z"),
        }
    }
}

/// Derivative keys: plain values or first derivatives along a Cartesian direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DerivKey {
    Value,
    X,
    Y,
    Z,
}

impl DerivKey {
    /// The Cartesian derivative keys.
    pub const XYZ: [DerivKey; 3] = [DerivKey::X, DerivKey::Y, DerivKey::Z];

    /// The derivative keys produced at a given derivative order.
    pub fn for_order(deriv_order: u32) -> Vec<DerivKey> {
        if deriv_order == 0 {
            vec![DerivKey::Value]
        } else {
            DerivKey::XYZ.to_vec()
        }
    }
}

impl fmt::Display for DerivKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivKey::Value => write!(f, "value"),
            DerivKey::X => write!(f, "d/dx"),
            DerivKey::Y => write!(f, "d/dy"),
            DerivKey::Z => write!(f, "d/dz"),
        }
    }
}

/// The key of one result matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultKey {
    /// The operator component.
    pub component: Component,

    /// The derivative key.
    pub deriv_key: DerivKey,

    /// The derivative centre. Zero for values.
    pub center: usize,
}

impl ResultKey {
    /// Creates a new result key.
    pub fn new(component: Component, deriv_key: DerivKey, center: usize) -> Self {
        Self {
            component,
            deriv_key,
            center,
        }
    }

    /// The key of a plain scalar value.
    pub fn value() -> Self {
        Self::new(Component::None, DerivKey::Value, 0)
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, centre {})",
            self.component, self.deriv_key, self.center
        )
    }
}

/// A map from result keys to dense result matrices.
pub type IntegralEvaluatorMap = IndexMap<ResultKey, Array2<f64>>;

/// Returns the result matrix under `key`.
///
/// # Errors
///
/// Errors if the map has no such key.
pub fn get_result<'a>(
    map: &'a IntegralEvaluatorMap,
    key: &ResultKey,
) -> Result<&'a Array2<f64>, anyhow::Error> {
    map.get(key)
        .ok_or_else(|| format_err!("No result matrix for key {key}."))
}

// ============
// ParticleType
// ============

/// A particle type with its charge and mass in atomic units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleType {
    /// The symbol of the particle type.
    pub symbol: String,

    /// The charge in units of the elementary charge.
    pub charge: f64,

    /// The mass in units of the electron mass.
    pub mass: f64,
}

impl ParticleType {
    /// The electron.
    pub fn electron() -> Self {
        Self {
            symbol: "e".to_string(),
            charge: -1.0,
            mass: 1.0,
        }
    }

    /// The positron.
    pub fn positron() -> Self {
        Self {
            symbol: "e+".to_string(),
            charge: 1.0,
            mass: 1.0,
        }
    }

    /// The proton.
    pub fn proton() -> Self {
        Self {
            symbol: "p".to_string(),
            charge: 1.0,
            mass: 1836.152673426,
        }
    }

    /// The charge scaling applied to attraction and dipole integrals. The engine assumes a
    /// negative unit charge, so a positive particle flips the sign.
    pub fn charge_scaling(&self) -> f64 {
        if self.charge > 0.0 {
            -self.charge
        } else {
            self.charge.abs()
        }
    }
}

impl Default for ParticleType {
    fn default() -> Self {
        Self::electron()
    }
}

impl fmt::Display for ParticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (charge {:+.3}, mass {:.6})",
            self.symbol, self.charge, self.mass
        )
    }
}

// =================
// IntegralSpecifier
// =================

/// A description of the integrals to be evaluated.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct IntegralSpecifier {
    /// The operator.
    pub op: Operator,

    /// The derivative order, zero or one.
    #[builder(default = "0")]
    pub deriv_order: u32,

    /// The atoms whose nuclei act as point charges.
    #[builder(default = "None")]
    pub atoms: Option<Vec<Atom>>,

    /// The origin of multipole operators in bohr.
    #[builder(default = "None")]
    pub multipole_origin: Option<Point3<f64>>,

    /// The total mass of the system for centre-of-mass corrections.
    #[builder(default = "None")]
    pub total_mass: Option<f64>,

    /// The particle types of the bra and ket functions. The first entry describes one-body
    /// integrals and the bra particle of two-body integrals.
    #[builder(default = "vec![ParticleType::electron()]")]
    pub type_vector: Vec<ParticleType>,
}

impl IntegralSpecifier {
    /// Returns a builder to construct a new [`IntegralSpecifier`].
    pub fn builder() -> IntegralSpecifierBuilder {
        IntegralSpecifierBuilder::default()
    }

    /// Creates a specifier for the value of an operator between electrons.
    pub fn new(op: Operator) -> Self {
        Self {
            op,
            deriv_order: 0,
            atoms: None,
            multipole_origin: None,
            total_mass: None,
            type_vector: vec![ParticleType::electron()],
        }
    }

    /// The particle type of the bra functions.
    pub fn first_type(&self) -> ParticleType {
        self.type_vector.first().cloned().unwrap_or_default()
    }

    /// The particle type of the ket functions of two-body integrals.
    pub fn second_type(&self) -> ParticleType {
        self.type_vector
            .get(1)
            .cloned()
            .unwrap_or_else(|| self.first_type())
    }

    /// The product of the charges of the two particle types of a two-body integral, or one if
    /// only a single particle type is given.
    pub fn two_body_scaling(&self) -> f64 {
        if self.type_vector.len() > 1 {
            self.type_vector[0].charge * self.type_vector[1].charge
        } else {
            1.0
        }
    }
}

impl fmt::Display for IntegralSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Operator: {}", self.op)?;
        writeln!(f, "Derivative order: {}", self.deriv_order)?;
        if let Some(atoms) = &self.atoms {
            writeln!(f, "Point charges: {} atoms", atoms.len())?;
        }
        if let Some(origin) = &self.multipole_origin {
            writeln!(
                f,
                "Multipole origin: ({:+.7}, {:+.7}, {:+.7})",
                origin.x, origin.y, origin.z
            )?;
        }
        if let Some(mass) = self.total_mass {
            writeln!(f, "Total mass: {mass:.7}")?;
        }
        for (i, ptype) in self.type_vector.iter().enumerate() {
            writeln!(f, "Particle type {i}: {ptype}")?;
        }
        Ok(())
    }
}
