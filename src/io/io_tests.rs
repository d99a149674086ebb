use ndarray::{array, Array2};

use crate::integrals::{Component, DerivKey, IntegralEvaluatorMap, ResultKey};
use crate::io::{
    read_molint_binary, read_molint_yaml, write_molint_binary, write_molint_yaml, MolintFileType,
};

#[test]
fn test_io_molint_binary_integral_map() {
    let mut map = IntegralEvaluatorMap::new();
    map.insert(ResultKey::value(), array![[1.0, 0.25], [0.25, 1.0]]);
    map.insert(
        ResultKey::new(Component::X, DerivKey::Value, 0),
        Array2::from_shape_fn((2, 3), |(i, j)| (i * 3 + j) as f64 - 2.5),
    );
    map.insert(
        ResultKey::new(Component::None, DerivKey::Y, 1),
        Array2::zeros((0, 0)),
    );

    let name = std::env::temp_dir().join("molint_io_test_map");
    write_molint_binary(&name, MolintFileType::Ints, &map).unwrap();
    assert!(name.with_extension("molint.ints").exists());

    let read: IntegralEvaluatorMap = read_molint_binary(&name, MolintFileType::Ints).unwrap();
    assert_eq!(read, map);
    assert_eq!(
        read.keys().collect::<Vec<_>>(),
        map.keys().collect::<Vec<_>>()
    );
}

#[test]
fn test_io_molint_binary_missing_file() {
    let name = std::env::temp_dir().join("molint_io_test_does_not_exist");
    let read = read_molint_binary::<IntegralEvaluatorMap, _>(&name, MolintFileType::Ints);
    assert!(read.is_err());
}

#[test]
fn test_io_molint_yaml() {
    let keys = vec![
        ResultKey::value(),
        ResultKey::new(Component::Z, DerivKey::X, 2),
    ];
    let name = std::env::temp_dir().join("molint_io_test_keys");
    write_molint_yaml(&name, &keys).unwrap();
    let read: Vec<ResultKey> = read_molint_yaml(name.with_extension("yml")).unwrap();
    assert_eq!(read, keys);
}
