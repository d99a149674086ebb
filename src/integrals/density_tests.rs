use ndarray::{array, Array2};

use crate::integrals::density::{DensityMatrix, SpinMatrix};

#[test]
fn test_density_spin_matrix_add_assign() {
    let mut restricted = SpinMatrix::Restricted(array![[1.0, 2.0], [3.0, 4.0]]);
    restricted
        .add_assign(&SpinMatrix::Restricted(Array2::eye(2)))
        .unwrap();
    assert_eq!(restricted.restricted(), Some(&array![[2.0, 2.0], [3.0, 5.0]]));

    let unrestricted_density =
        DensityMatrix::unrestricted(Array2::eye(2), Some(Array2::eye(2))).unwrap();
    let mut unrestricted = SpinMatrix::zeros_like(&unrestricted_density);
    unrestricted
        .add_assign(&SpinMatrix::Unrestricted {
            alpha: Array2::eye(2),
            beta: Some(Array2::eye(2) * 2.0),
        })
        .unwrap();
    assert_eq!(unrestricted.alpha(), Some(&Array2::eye(2)));
    assert_eq!(unrestricted.beta(), Some(&(Array2::eye(2) * 2.0)));
}

#[test]
fn test_density_spin_matrix_add_assign_mismatch() {
    let original = SpinMatrix::Restricted(Array2::eye(2));

    let mut restricted = original.clone();
    let unrestricted = SpinMatrix::Unrestricted {
        alpha: Array2::eye(2),
        beta: None,
    };
    let err = restricted.add_assign(&unrestricted).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot add spin matrices of different spin structures or dimensions."
    );
    assert_eq!(restricted, original);

    assert!(restricted
        .add_assign(&SpinMatrix::Restricted(Array2::eye(3)))
        .is_err());

    let mut alpha_only = unrestricted.clone();
    let with_beta = SpinMatrix::Unrestricted {
        alpha: Array2::eye(2),
        beta: Some(Array2::eye(2)),
    };
    assert!(alpha_only.add_assign(&with_beta).is_err());
    assert_eq!(alpha_only, unrestricted);
}
