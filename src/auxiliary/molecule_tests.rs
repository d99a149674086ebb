use approx;
use nalgebra::Point3;

use crate::auxiliary::atom::{Atom, ElementMap, ANGSTROM_TO_BOHR};
use crate::auxiliary::molecule::Molecule;

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

#[test]
fn test_atom_from_xyz_converts_to_bohr() {
    let emap = ElementMap::new();
    let atom = Atom::from_xyz("O 0.0 1.0 -2.0", &emap).unwrap();
    assert_eq!(atom.atomic_number, 8);
    assert_eq!(atom.atomic_symbol, "O");
    approx::assert_relative_eq!(atom.atomic_mass, 15.999, epsilon = 1e-2);
    approx::assert_relative_eq!(
        atom.coordinates,
        Point3::new(0.0, ANGSTROM_TO_BOHR, -2.0 * ANGSTROM_TO_BOHR)
    );
}

#[test]
fn test_atom_from_xyz_rejects_malformed_lines() {
    let emap = ElementMap::new();
    assert!(Atom::from_xyz("O 0.0 1.0", &emap).is_err());
    assert!(Atom::from_xyz("Xx 0.0 1.0 2.0", &emap).is_err());
    assert!(Atom::from_xyz("H 0.0 one 2.0", &emap).is_err());
}

#[test]
fn test_molecule_from_xyz() {
    let mol = Molecule::from_xyz(format!("{ROOT}/tests/xyz/water.xyz")).unwrap();
    assert_eq!(mol.atoms.len(), 3);
    assert_eq!(mol.elements(), vec!["O", "H"]);
    approx::assert_relative_eq!(mol.total_mass(), 18.015, epsilon = 1e-2);
}

#[test]
fn test_molecule_from_xyz_str_checks_atom_count() {
    let contents = "3\n\nH 0 0 0\nH 1.2 0 0\n";
    assert!(Molecule::from_xyz_str(contents).is_err());

    let contents = "2\n\nH 0 0 0\nH 1.2 0 0\n";
    let mol = Molecule::from_xyz_str(contents).unwrap();
    approx::assert_relative_eq!(mol.atoms[1].coordinates[0], 1.2 * ANGSTROM_TO_BOHR);
}
