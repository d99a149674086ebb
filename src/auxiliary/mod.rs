//! Atoms, molecules and element data.

pub mod atom;
pub mod molecule;
