//! Two-body Coulomb integrals and their direct contraction with densities.
//!
//! A [`evaluator::TwoBodyEvaluator`] walks the significant shell quartets of two basis sets,
//! asks a [`prescreener::Prescreener`] whether each quartet is worth computing, and hands the
//! computed integrals to a [`digester::Digester`], which either stores them or folds them into
//! Fock-matrix contributions.

pub mod com_saver;
pub mod coulomb_exchange;
pub mod digester;
pub mod evaluator;
pub mod prescreener;
pub mod saver;
pub mod symmetry;
pub mod two_type_coulomb;


#[cfg(test)]
#[path = "digester_tests.rs"]
mod digester_tests;
