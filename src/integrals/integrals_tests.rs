use approx;
use indexmap::IndexMap;
use nalgebra::Point3;
use ndarray::array;

use crate::integrals::{
    get_result, Component, DerivKey, IntegralEvaluatorMap, IntegralSpecifier, Operator,
    ParticleType, ResultKey,
};

#[test]
fn test_integrals_operator_kinds() {
    assert!(Operator::Coulomb.is_two_body());
    assert!(Operator::CoulombCOM.is_two_body());
    for op in [
        Operator::Overlap,
        Operator::Kinetic,
        Operator::KineticCOM,
        Operator::PointCharges,
        Operator::Dipole,
    ] {
        assert!(!op.is_two_body());
    }
    assert_eq!(Operator::KineticCOM.to_string(), "KineticCOM");
}

#[test]
fn test_integrals_specifier_builder_defaults() {
    let spec = IntegralSpecifier::builder()
        .op(Operator::Dipole)
        .multipole_origin(Some(Point3::new(0.0, 0.0, 1.0)))
        .build()
        .unwrap();
    assert_eq!(spec.deriv_order, 0);
    assert!(spec.atoms.is_none());
    assert!(spec.total_mass.is_none());
    assert_eq!(spec.type_vector, vec![ParticleType::electron()]);
    assert_eq!(spec.first_type(), ParticleType::electron());
    assert_eq!(spec.second_type(), ParticleType::electron());
    approx::assert_relative_eq!(spec.two_body_scaling(), 1.0);

    assert!(IntegralSpecifier::builder().deriv_order(1).build().is_err());
}

#[test]
fn test_integrals_particle_scalings() {
    approx::assert_relative_eq!(ParticleType::electron().charge_scaling(), 1.0);
    approx::assert_relative_eq!(ParticleType::positron().charge_scaling(), -1.0);
    approx::assert_relative_eq!(ParticleType::proton().charge_scaling(), -1.0);

    let mut spec = IntegralSpecifier::new(Operator::Coulomb);
    spec.type_vector = vec![ParticleType::electron(), ParticleType::proton()];
    approx::assert_relative_eq!(spec.two_body_scaling(), -1.0);
    assert_eq!(spec.second_type().symbol, "p");
}

#[test]
fn test_integrals_result_map_lookup() {
    let mut map = IntegralEvaluatorMap::new();
    map.insert(ResultKey::value(), array![[1.0, 0.5], [0.5, 1.0]]);
    map.insert(
        ResultKey::new(Component::X, DerivKey::Value, 0),
        array![[0.0, 1.0], [1.0, 0.0]],
    );
    assert_eq!(get_result(&map, &ResultKey::value()).unwrap()[[0, 1]], 0.5);
    assert!(get_result(&map, &ResultKey::new(Component::Y, DerivKey::Value, 0)).is_err());

    let bytes = bincode::serialize(&map).unwrap();
    let read: IndexMap<ResultKey, ndarray::Array2<f64>> = bincode::deserialize(&bytes).unwrap();
    assert_eq!(read, map);
    assert_eq!(read.keys().next(), Some(&ResultKey::value()));
}

#[test]
fn test_integrals_deriv_keys() {
    assert_eq!(DerivKey::for_order(0), vec![DerivKey::Value]);
    assert_eq!(
        DerivKey::for_order(1),
        vec![DerivKey::X, DerivKey::Y, DerivKey::Z]
    );
    assert_eq!(
        ResultKey::new(Component::None, DerivKey::Y, 3).to_string(),
        "(-, d/dy, centre 3)"
    );
}
