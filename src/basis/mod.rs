//! Gaussian basis sets: shells, basis set data and screened shell pairs.

pub mod basis_set;
pub mod library;
pub mod shell;
pub mod shell_pairs;
