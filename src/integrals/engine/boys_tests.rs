use std::f64::consts::PI;

use approx;

use crate::integrals::engine::boys::{boys_reference, BoysTable};

#[test]
fn test_boys_at_origin() {
    let table = BoysTable::new(8);
    let mut values = [0.0; 9];
    table.evaluate(0.0, &mut values);
    for (n, value) in values.iter().enumerate() {
        approx::assert_relative_eq!(*value, 1.0 / (2 * n + 1) as f64, epsilon = 1e-14);
    }
}

#[test]
fn test_boys_known_value() {
    // F_0(1) = int_0^1 exp(-t^2) dt
    let table = BoysTable::new(2);
    let mut values = [0.0; 1];
    table.evaluate(1.0, &mut values);
    approx::assert_relative_eq!(values[0], 0.746_824_132_812_427_1, epsilon = 1e-13);
}

#[test]
fn test_boys_interpolation_matches_reference() {
    let table = BoysTable::new(12);
    for &t in [0.013, 0.37, 1.234, 4.9876, 12.3456, 27.81, 49.97].iter() {
        let mut interpolated = [0.0; 13];
        let mut reference = [0.0; 13];
        table.evaluate(t, &mut interpolated);
        boys_reference(t, &mut reference);
        for (fi, fr) in interpolated.iter().zip(reference.iter()) {
            approx::assert_relative_eq!(*fi, *fr, max_relative = 1e-12);
        }
    }
}

#[test]
fn test_boys_asymptotic_region() {
    let table = BoysTable::new(4);
    let mut values = [0.0; 5];
    table.evaluate(80.0, &mut values);
    approx::assert_relative_eq!(values[0], 0.5 * (PI / 80.0).sqrt(), epsilon = 1e-15);
    let mut reference = [0.0; 5];
    boys_reference(80.0, &mut reference);
    for (fa, fr) in values.iter().zip(reference.iter()) {
        approx::assert_relative_eq!(*fa, *fr, max_relative = 1e-12);
    }
}

#[test]
#[should_panic]
fn test_boys_order_out_of_range() {
    let table = BoysTable::new(2);
    let mut values = [0.0; 4];
    table.evaluate(1.0, &mut values);
}
