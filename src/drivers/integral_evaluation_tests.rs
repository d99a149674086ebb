use approx;
use std::path::PathBuf;

use crate::auxiliary::molecule::Molecule;
use crate::drivers::integral_evaluation::{
    IntegralEvaluationDriver, IntegralEvaluationParams, IntegralJob,
};
use crate::drivers::integral_service::{BasisSetName, IntegralEvaluatorSettings};
use crate::drivers::MolintDriver;
use crate::integrals::{IntegralEvaluatorMap, Operator, ParticleType, ResultKey};
use crate::io::{read_molint_binary, MolintFileType};

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

fn h2_params(jobs: Vec<IntegralJob>) -> IntegralEvaluationParams {
    IntegralEvaluationParams::builder()
        .xyz(PathBuf::from(format!("{ROOT}/tests/xyz/h2.xyz")))
        .basis(BasisSetName::Uniform("def2-svp".to_string()))
        .settings(
            IntegralEvaluatorSettings::builder()
                .use_pure_spherical(false)
                .build()
                .unwrap(),
        )
        .jobs(jobs)
        .build()
        .unwrap()
}

#[test]
fn test_drivers_integral_evaluation_h2() {
    let _ = env_logger::builder().is_test(true).try_init();
    let params = h2_params(vec![
        IntegralJob::builder().op(Operator::Overlap).build().unwrap(),
        IntegralJob::builder().op(Operator::Coulomb).build().unwrap(),
        IntegralJob::builder()
            .op(Operator::Dipole)
            .multipole_origin(Some([0.0, 0.0, 0.0]))
            .build()
            .unwrap(),
    ]);
    let mut driver = IntegralEvaluationDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(driver.result().is_err());
    assert!(driver.run().is_ok());

    let result = driver.result().unwrap();
    assert_eq!(result.basis.n_funcs(), 10);
    assert!(result.basis.are_shell_pairs_evaluated());
    assert_eq!(result.jobs.len(), 3);

    let overlap = &result.jobs[0].map[&ResultKey::value()];
    approx::assert_abs_diff_eq!(overlap[(0, 1)], 0.684799825, epsilon = 1e-8);

    let coulomb = &result.jobs[1].map[&ResultKey::value()];
    assert_eq!(coulomb.dim(), (100, 100));
    approx::assert_abs_diff_eq!(coulomb[(0, 0)], 0.8971413572489109, epsilon = 1e-8);

    assert_eq!(result.jobs[2].map.len(), 3);
    assert!(result.to_string().contains("Dipole"));
}

#[test]
fn test_drivers_integral_evaluation_given_molecule() {
    let _ = env_logger::builder().is_test(true).try_init();
    let params = h2_params(vec![IntegralJob::builder()
        .op(Operator::PointCharges)
        .particle_types(vec![ParticleType::positron()])
        .build()
        .unwrap()]);
    // The molecule given directly takes precedence over the path in the parameters.
    let molecule = Molecule::from_xyz_str("2\n\nH 0 0 0\nH 1.2 0 0\n").unwrap();
    let mut driver = IntegralEvaluationDriver::builder()
        .parameters(&params)
        .molecule(Some(&molecule))
        .build()
        .unwrap();
    assert!(driver.run().is_ok());
    let attraction = &driver.result().unwrap().jobs[0].map[&ResultKey::value()];
    // Nuclei repel positrons.
    assert!(attraction[(0, 0)] > 0.0);
}

#[test]
fn test_drivers_integral_evaluation_writes_binary() {
    let _ = env_logger::builder().is_test(true).try_init();
    let name = std::env::temp_dir().join("molint_driver_overlap");
    let params = h2_params(vec![IntegralJob::builder()
        .op(Operator::Overlap)
        .output(Some(name.clone()))
        .build()
        .unwrap()]);
    let mut driver = IntegralEvaluationDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(driver.run().is_ok());
    let read: IntegralEvaluatorMap = read_molint_binary(&name, MolintFileType::Ints).unwrap();
    assert_eq!(&read, &driver.result().unwrap().jobs[0].map);
}

#[test]
fn test_drivers_integral_evaluation_missing_total_mass() {
    let _ = env_logger::builder().is_test(true).try_init();
    let params = h2_params(vec![IntegralJob::builder()
        .op(Operator::KineticCOM)
        .build()
        .unwrap()]);
    let mut driver = IntegralEvaluationDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(driver.run().is_err());
    assert!(driver.result().is_err());
}

#[test]
fn test_drivers_integral_evaluation_params_yaml() {
    let yaml = "\
xyz: tests/xyz/water.xyz
basis:
  O: sto-3g
  H: def2-svp
jobs:
  - op: Overlap
  - op: CoulombCOM
    total_mass: 32810.0
    output: water_com
";
    let params: IntegralEvaluationParams = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(params.settings, IntegralEvaluatorSettings::default());
    assert_eq!(params.jobs.len(), 2);
    assert_eq!(params.jobs[0].deriv_order, 0);
    assert_eq!(params.jobs[0].particle_types, vec![ParticleType::electron()]);
    assert_eq!(params.jobs[1].total_mass, Some(32810.0));
    assert_eq!(params.jobs[1].output, Some(PathBuf::from("water_com")));
    assert!(matches!(params.basis, BasisSetName::PerElement(_)));

    let round_trip: IntegralEvaluationParams =
        serde_yaml::from_str(&serde_yaml::to_string(&params).unwrap()).unwrap();
    assert_eq!(round_trip, params);
}
