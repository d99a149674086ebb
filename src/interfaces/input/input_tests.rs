use std::path::PathBuf;

use crate::drivers::integral_service::BasisSetName;
use crate::integrals::{Operator, ParticleType};
use crate::interfaces::InputHandle;
use crate::io::read_molint_yaml;

use super::Input;

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

#[test]
fn test_interfaces_input_integral_evaluation() {
    let name = format!("{ROOT}/tests/input/test_input_integral_evaluation.yml");
    let inp = read_molint_yaml::<Input, _>(&name).unwrap();
    let params = &inp.integral_evaluation;
    assert_eq!(params.xyz, PathBuf::from("tests/xyz/h2.xyz"));
    assert_eq!(params.basis, BasisSetName::Uniform("def2-svp".to_string()));
    assert!(!params.settings.use_pure_spherical);
    assert_eq!(
        params.jobs.iter().map(|job| job.op).collect::<Vec<_>>(),
        vec![
            Operator::Overlap,
            Operator::Kinetic,
            Operator::Dipole,
            Operator::Coulomb
        ]
    );
    assert_eq!(params.jobs[2].multipole_origin, Some([0.0, 0.0, 0.0]));
    assert_eq!(params.jobs[3].deriv_order, 1);
    assert!(params.jobs.iter().all(|job| job.output.is_none()));
}

#[test]
fn test_interfaces_input_integral_evaluation_per_element() {
    let name = format!("{ROOT}/tests/input/test_input_integral_evaluation_per_element.yml");
    let inp = read_molint_yaml::<Input, _>(&name).unwrap();
    let params = &inp.integral_evaluation;
    let BasisSetName::PerElement(names) = &params.basis else {
        panic!("Expected a per-element basis set.");
    };
    assert_eq!(names["O"], "sto-3g");
    assert_eq!(names["H"], "def2-svp");
    assert!(params.settings.use_pure_spherical);
    assert_eq!(params.jobs[0].particle_types, vec![ParticleType::electron()]);
    assert_eq!(params.jobs[1].particle_types, vec![ParticleType::positron()]);
    assert_eq!(params.jobs[1].total_mass, Some(32810.0));
}

#[test]
fn test_interfaces_input_handle() {
    let _ = env_logger::builder().is_test(true).try_init();
    let name = format!("{ROOT}/tests/input/test_input_integral_evaluation.yml");
    let mut inp = read_molint_yaml::<Input, _>(&name).unwrap();
    inp.integral_evaluation.xyz = PathBuf::from(format!("{ROOT}/tests/xyz/h2.xyz"));
    assert!(inp.handle().is_ok());

    inp.integral_evaluation.xyz = PathBuf::from(format!("{ROOT}/tests/xyz/missing.xyz"));
    assert!(inp.handle().is_err());
}
