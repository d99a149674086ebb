use approx;
use ndarray::{array, Array2};

use crate::integrals::engine::solid_harmonics::{cart_to_pure, transform_tensor};

#[test]
fn test_cart_to_pure_p() {
    // Increasing m: y, z, x.
    let t = cart_to_pure(1);
    approx::assert_relative_eq!(
        t,
        array![[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
        epsilon = 1e-14
    );
}

#[test]
fn test_cart_to_pure_d() {
    // Cartesian order: xx, xy, xz, yy, yz, zz.
    let t = cart_to_pure(2);
    let s3 = 3f64.sqrt();
    let reference = array![
        [0.0, s3, 0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, s3, 0.0],
        [-0.5, 0.0, 0.0, -0.5, 0.0, 1.0],
        [0.0, 0.0, s3, 0.0, 0.0, 0.0],
        [0.5 * s3, 0.0, 0.0, -0.5 * s3, 0.0, 0.0],
    ];
    approx::assert_relative_eq!(t, reference, epsilon = 1e-14);
}

#[test]
fn test_cart_to_pure_shapes() {
    for l in 0..5 {
        let t = cart_to_pure(l);
        assert_eq!(
            t.dim(),
            ((2 * l + 1) as usize, ((l + 1) * (l + 2) / 2) as usize)
        );
    }
}

#[test]
fn test_transform_tensor_matches_matrix_products() {
    let a: Array2<f64> = array![[1.0, 2.0], [0.5, -1.0], [0.0, 3.0]];
    let x: Array2<f64> = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
    let b: Array2<f64> = array![[0.0, 1.0, 0.0], [2.0, 0.0, -1.0]];
    let data: Vec<f64> = x.iter().copied().collect();

    let (out, dims) = transform_tensor(&data, &[2, 3], &[Some(&a), Some(&b)]);
    assert_eq!(dims, vec![3, 2]);
    let reference = a.dot(&x).dot(&b.t());
    let out = Array2::from_shape_vec((3, 2), out).unwrap();
    approx::assert_relative_eq!(out, reference, epsilon = 1e-14);

    let (same, dims) = transform_tensor(&data, &[2, 3], &[None, None]);
    assert_eq!(dims, vec![2, 3]);
    assert_eq!(same, data);
}
