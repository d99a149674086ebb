//! # molint: Molecular Integrals over Gaussian Basis Functions
//!
//! molint evaluates one-body and two-body integrals over contracted Gaussian basis sets for
//! molecules, with the following capabilities:
//! - basis sets from a built-in library, assigned uniformly or per element,
//! - overlap, kinetic-energy, point-charge attraction and dipole integrals, including their first
//!   derivatives with respect to the basis function centres,
//! - electron-repulsion integrals and their first derivatives, stored as full tensors,
//! - centre-of-mass corrected kinetic-energy and repulsion integrals for arbitrary particle types,
//!   and
//! - direct construction of Coulomb and exchange matrices from density matrices, optionally
//!   prescreened with Cauchy–Schwarz bounds.
//!
//! Two-body integrals are evaluated in parallel over shell pairs with [`rayon`], and each
//! computed shell quartet is handed to a [`Digester`](integrals::two_body::digester::Digester)
//! that decides what to do with it.
//!
//! ## Features
//!
//! - `bse`: Enables basis sets to be fetched from the
//!   [Basis Set Exchange](https://www.basissetexchange.org/) through
//!   [reqwest](https://github.com/seanmonstar/reqwest)
//!
//! ## Examples and usage
//!
//! For most items (structs, enums, functions, and traits), their usages are illustrated in test
//! functions.
//!
//! The `molint` binary reads a YAML configuration file given by `--config` and writes its main
//! output to the console, or to the file given by `--output`.

pub mod auxiliary;
pub mod basis;
pub mod drivers;
pub mod integrals;
pub mod interfaces;
pub mod io;
