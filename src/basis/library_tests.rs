use nalgebra::Point3;

use crate::auxiliary::atom::{Atom, ElementMap};
use crate::basis::library::{builtin_basis_set, builtin_basis_sets, parse_fortran_float};

#[test]
fn test_library_builtin_names() {
    assert_eq!(builtin_basis_sets(), vec!["def2-svp", "def2-tzvp", "sto-3g"]);
    assert!(builtin_basis_set("DEF2-SVP").is_ok());
    assert!(builtin_basis_set("cc-pvqz").is_err());
}

#[test]
fn test_library_def2_svp_hydrogen() {
    let emap = ElementMap::new();
    let h = Atom::new("H", Point3::new(0.0, 0.0, 1.0), &emap).unwrap();
    let shells = builtin_basis_set("def2-svp")
        .unwrap()
        .shells_for_atom(&h, 3, false)
        .unwrap();
    assert_eq!(shells.len(), 3);
    assert_eq!(shells.iter().map(|s| s.l).collect::<Vec<_>>(), vec![0, 0, 1]);
    assert_eq!(shells[0].exponents, vec![13.010701, 1.9622572, 0.44453796]);
    assert_eq!(shells[0].coefficients[0], 0.019682158);
    assert!(shells.iter().all(|s| s.atom_index == 3 && !s.pure));
    assert!(shells.iter().all(|s| s.origin == h.coordinates));
    assert_eq!(shells.iter().map(|s| s.n_funcs()).sum::<usize>(), 5);
}

#[test]
fn test_library_sto_3g_splits_sp_shells() {
    let emap = ElementMap::new();
    let c = Atom::new("C", Point3::origin(), &emap).unwrap();
    let shells = builtin_basis_set("sto-3g")
        .unwrap()
        .shells_for_atom(&c, 0, true)
        .unwrap();
    assert_eq!(shells.iter().map(|s| s.l).collect::<Vec<_>>(), vec![0, 0, 1]);
    assert_eq!(shells[1].exponents, shells[2].exponents);
    assert_eq!(shells[1].coefficients[0], -0.09996723);
    assert_eq!(shells[2].coefficients[0], 0.15591627);

    let s = Atom::new("S", Point3::origin(), &emap).unwrap();
    assert!(builtin_basis_set("sto-3g")
        .unwrap()
        .shells_for_atom(&s, 0, true)
        .is_err());
}

#[test]
fn test_library_fortran_floats() {
    assert_eq!(parse_fortran_float("0.5D+01").unwrap(), 5.0);
    assert_eq!(parse_fortran_float(" 1.25E-1 ").unwrap(), 0.125);
    assert!(parse_fortran_float("abc").is_err());
}
