use approx;
use ndarray::Array2;

use crate::auxiliary::molecule::Molecule;
use crate::basis::basis_set::BasisSet;
use crate::integrals::density::DensityMatrix;
use crate::integrals::engine::EngineContext;
use crate::integrals::two_body::com_saver::COMSaverDigester;
use crate::integrals::two_body::coulomb_exchange::CoulombExchangeDigester;
use crate::integrals::two_body::digester::{Digester, PerThread, ShellQuartet};
use crate::integrals::two_body::prescreener::{
    CauchySchwarzDensityPrescreener, Prescreener, VoidPrescreener,
};
use crate::integrals::two_body::saver::SaverDigester;
use crate::integrals::two_body::symmetry::IntegralSymmetry;
use crate::integrals::{
    Component, DerivKey, IntegralSpecifier, Operator, ParticleType, ResultKey,
};

fn h2_basis() -> BasisSet {
    let mol = Molecule::from_xyz_str("2\n\nH 0 0 0\nH 1.2 0 0\n").unwrap();
    BasisSet::from_library("def2-svp", &mol.atoms, false).unwrap()
}

#[test]
fn test_digester_saver_writes_symmetric_positions() {
    let basis = h2_basis();
    let dim = basis.n_funcs();
    let spec = IntegralSpecifier::new(Operator::Coulomb);
    let digester =
        SaverDigester::new(&basis, &basis, &spec, IntegralSymmetry::Eightfold).unwrap();
    assert!(digester.bra_ket_symmetric());
    digester.with_accumulator(|acc| digester.digest(acc, 0.25, [3, 1, 2, 0], 0, 1.0));
    let map = digester.finalize().unwrap();
    let result = &map[&ResultKey::value()];
    for [i, j, k, l] in IntegralSymmetry::Eightfold.symmetric_indices([3, 1, 2, 0]) {
        assert_eq!(result[(i * dim + j, k * dim + l)], 0.25);
    }
    assert_eq!(result.iter().filter(|&&x| x != 0.0).count(), 8);
}

#[test]
fn test_digester_saver_scales_by_charges() {
    let basis = h2_basis();
    let dim = basis.n_funcs();
    let spec = IntegralSpecifier::builder()
        .op(Operator::Coulomb)
        .type_vector(vec![ParticleType::electron(), ParticleType::positron()])
        .build()
        .unwrap();
    let digester =
        SaverDigester::new(&basis, &basis, &spec, IntegralSymmetry::Fourfold).unwrap();
    assert!(!digester.bra_ket_symmetric());
    digester.with_accumulator(|acc| digester.digest(acc, 0.5, [1, 0, 2, 2], 0, 1.0));
    let map = digester.finalize().unwrap();
    let result = &map[&ResultKey::value()];
    assert_eq!(result[(dim, 2 * dim + 2)], -0.5);
    assert_eq!(result[(1, 2 * dim + 2)], -0.5);
    assert_eq!(result[(2 * dim + 2, dim)], 0.0);
}

#[test]
fn test_digester_saver_derivative_centres_follow_functions() {
    let basis = h2_basis();
    let dim = basis.n_funcs();
    let spec = IntegralSpecifier::builder()
        .op(Operator::Coulomb)
        .deriv_order(1)
        .build()
        .unwrap();
    let digester =
        SaverDigester::new(&basis, &basis, &spec, IntegralSymmetry::Eightfold).unwrap();

    // The y derivative with respect to the centre of the second function.
    digester.with_accumulator(|acc| digester.digest(acc, 1.5, [4, 3, 2, 1], 3 + 1, 1.0));
    let map = digester.finalize().unwrap();
    assert_eq!(map.len(), 12);
    let at = |centre: usize, [i, j, k, l]: [usize; 4]| {
        map[&ResultKey::new(Component::None, DerivKey::Y, centre)][(i * dim + j, k * dim + l)]
    };
    assert_eq!(at(1, [4, 3, 2, 1]), 1.5);
    assert_eq!(at(0, [3, 4, 2, 1]), 1.5);
    assert_eq!(at(3, [2, 1, 4, 3]), 1.5);
    assert_eq!(at(2, [1, 2, 3, 4]), 1.5);
    assert_eq!(at(0, [4, 3, 2, 1]), 0.0);
}

#[test]
fn test_digester_saver_rejects_unsupported_symmetry() {
    let basis = h2_basis();
    let spec = IntegralSpecifier::new(Operator::Coulomb);
    assert!(SaverDigester::new(&basis, &basis, &spec, IntegralSymmetry::Twofold).is_err());
}

#[test]
fn test_digester_com_coupling_flips_sign_within_pairs() {
    let basis = h2_basis();
    let dim = basis.n_funcs();
    let context = EngineContext::new(basis.max_l());
    let spec = IntegralSpecifier::builder()
        .op(Operator::CoulombCOM)
        .total_mass(Some(2.0))
        .build()
        .unwrap();
    let digester =
        COMSaverDigester::new(&basis, &basis, &spec, &context, IntegralSymmetry::Fourfold)
            .unwrap();
    digester.with_accumulator(|acc| digester.digest(acc, 0.3, [5, 0, 7, 2], 0, 1.0));
    let map = digester.finalize().unwrap();
    let result = &map[&ResultKey::value()];
    let at = |i: usize, j: usize, k: usize, l: usize| result[(i * dim + j, k * dim + l)];

    let direct = at(5, 0, 7, 2);
    let coupled = direct - 0.3;
    assert!(coupled.abs() > 1e-6);
    approx::assert_abs_diff_eq!(at(0, 5, 2, 7), direct, epsilon = 1e-14);
    approx::assert_abs_diff_eq!(at(0, 5, 7, 2), 0.3 - coupled, epsilon = 1e-14);
    approx::assert_abs_diff_eq!(at(5, 0, 2, 7), 0.3 - coupled, epsilon = 1e-14);
    approx::assert_abs_diff_eq!(at(7, 2, 5, 0), direct, epsilon = 1e-14);
    approx::assert_abs_diff_eq!(at(2, 7, 5, 0), 0.3 - coupled, epsilon = 1e-14);
}

#[test]
fn test_digester_com_requires_total_mass() {
    let basis = h2_basis();
    let context = EngineContext::new(basis.max_l());
    let spec = IntegralSpecifier::new(Operator::CoulombCOM);
    let err = COMSaverDigester::new(&basis, &basis, &spec, &context, IntegralSymmetry::Twofold)
        .unwrap_err();
    assert_eq!(err.to_string(), "No total mass given in integral specifier.");
}

#[test]
fn test_digester_coulomb_exchange_degeneracy_and_quartet() {
    let basis = h2_basis();
    let n = basis.n_funcs();
    let density = DensityMatrix::Restricted(Array2::eye(n));
    let spec = IntegralSpecifier::new(Operator::Coulomb);
    let mut digester = CoulombExchangeDigester::new(&basis, &basis, &spec, &density).unwrap();
    digester.initialize(2);
    assert_eq!(digester.compute_degeneracy([0, 0, 0, 0]), 1.0);
    assert_eq!(digester.compute_degeneracy([1, 0, 1, 0]), 4.0);
    assert_eq!(digester.compute_degeneracy([2, 1, 1, 0]), 8.0);

    // A single (00|00) value in a quartet of s shells.
    let buffer = Array2::from_elem((1, 1), 0.8);
    let quartet = ShellQuartet {
        shells: [0, 0, 0, 0],
        offsets: [0, 0, 0, 0],
        sizes: [1, 1, 1, 1],
    };
    digester.digest_quartet(buffer.view(), &quartet);
    let result = digester.finalize().unwrap();
    let coulomb = result.coulomb.restricted().unwrap();
    let exchange = result.exchange.restricted().unwrap();
    approx::assert_abs_diff_eq!(coulomb[(0, 0)], 0.8, epsilon = 1e-14);
    approx::assert_abs_diff_eq!(exchange[(0, 0)], 0.8, epsilon = 1e-14);
    assert_eq!(coulomb.iter().filter(|&&x| x != 0.0).count(), 1);
}

#[test]
fn test_digester_per_thread_accumulators() {
    let slots = PerThread::new(0, || 0usize);
    slots.with(|x| *x += 2);
    slots.with(|x| *x += 3);
    assert_eq!(slots.into_inner(), vec![5]);
}

#[test]
fn test_prescreener_cauchy_schwarz_density() {
    let basis = h2_basis();
    let n = basis.n_funcs();
    assert!(VoidPrescreener.is_significant([0, 0, 0, 0], Some(0.0)));

    let zero = DensityMatrix::Restricted(Array2::zeros((n, n)));
    let prescreener = CauchySchwarzDensityPrescreener::new(&basis, &zero, 1e-12).unwrap();
    assert!(!prescreener.is_significant([1, 0, 1, 0], Some(1.0)));
    assert!(prescreener.is_significant([1, 0, 1, 0], None));

    // Only the block of the first shell with itself is populated.
    let mut d = Array2::<f64>::zeros((n, n));
    d[(0, 0)] = 1.0;
    let density = DensityMatrix::Restricted(d);
    let prescreener = CauchySchwarzDensityPrescreener::new(&basis, &density, 1e-8).unwrap();
    assert!(prescreener.is_significant([0, 0, 2, 1], Some(1e-6)));
    assert!(!prescreener.is_significant([2, 1, 2, 1], Some(1e-6)));
    assert!(!prescreener.is_significant([0, 0, 2, 1], Some(1e-9)));

    let wrong = DensityMatrix::Restricted(Array2::zeros((n + 1, n + 1)));
    assert!(CauchySchwarzDensityPrescreener::new(&basis, &wrong, 1e-12).is_err());
}
